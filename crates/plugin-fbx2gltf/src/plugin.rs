//! Plugin entry point: resolves the task context through the host and
//! drives the processor.

use std::sync::Arc;

use tracing::{info, warn};

use meshpipe_core::config::AppConfig;
use meshpipe_core::config::workspace::WorkspaceConfig;
use meshpipe_core::traits::{CommandRunner, CommandSpec, ProjectResolver};

use crate::config::ConversionConfig;
use crate::error::ConversionError;
use crate::models::{ConversionOptions, TaskContext, TaskOutput};
use crate::processor::ConversionProcessor;

/// Target and plugin section name.
pub const TARGET_NAME: &str = "fbx2gltf";

/// Runs the `fbx2gltf` target for workspace projects.
#[derive(Debug, Clone)]
pub struct Fbx2GltfExecutor {
    /// Host command runner, also used for availability probes.
    runner: Arc<dyn CommandRunner>,
    /// Batch processor.
    processor: ConversionProcessor,
}

impl Fbx2GltfExecutor {
    /// Create an executor from plugin settings.
    pub fn new(config: ConversionConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            processor: ConversionProcessor::new(config, Arc::clone(&runner)),
            runner,
        }
    }

    /// Create an executor from the `[plugins.fbx2gltf]` section.
    pub fn from_app_config(
        config: &AppConfig,
        runner: Arc<dyn CommandRunner>,
    ) -> Result<Self, ConversionError> {
        let settings = ConversionConfig::from_section(config.plugin_section(TARGET_NAME))?;
        Ok(Self::new(settings, runner))
    }

    /// Plugin settings.
    pub fn config(&self) -> &ConversionConfig {
        self.processor.config()
    }

    /// The underlying processor.
    pub fn processor(&self) -> &ConversionProcessor {
        &self.processor
    }

    /// Resolve workspace and project roots for `project`.
    pub fn context_for(
        &self,
        resolver: &dyn ProjectResolver,
        project: &str,
    ) -> Result<TaskContext, ConversionError> {
        let project_root = resolver.resolve_project(project)?;
        Ok(TaskContext {
            workspace_root: resolver.workspace_root(),
            project_name: project.to_string(),
            project_root,
        })
    }

    /// Parse the project's `fbx2gltf` target options.
    pub fn options_for(
        workspace: &WorkspaceConfig,
        project: &str,
    ) -> Result<ConversionOptions, ConversionError> {
        let raw = workspace
            .project(project)?
            .targets
            .get(TARGET_NAME)
            .ok_or_else(|| ConversionError::MissingTarget {
                project: project.to_string(),
                target: TARGET_NAME.to_string(),
            })?;
        ConversionOptions::from_value(raw)
    }

    /// Run the target for `project` with explicit options.
    pub async fn execute(
        &self,
        resolver: &dyn ProjectResolver,
        project: &str,
        options: &ConversionOptions,
    ) -> Result<TaskOutput, ConversionError> {
        if !self.config().enabled {
            return Err(ConversionError::Disabled);
        }

        let context = self.context_for(resolver, project)?;
        info!(
            project = %context.project_name,
            root = %context.project_root.display(),
            in_path = %options.in_path,
            "Running fbx2gltf target"
        );
        self.processor.execute(&context, options).await
    }

    /// Run the target for `project` using the options from its workspace
    /// entry.
    pub async fn execute_target(
        &self,
        workspace: &WorkspaceConfig,
        project: &str,
    ) -> Result<TaskOutput, ConversionError> {
        let options = Self::options_for(workspace, project)?;
        self.execute(workspace, project, &options).await
    }

    /// Converter invocations a run of `project` would perform.
    pub async fn plan_target(
        &self,
        workspace: &WorkspaceConfig,
        project: &str,
    ) -> Result<Vec<CommandSpec>, ConversionError> {
        let options = Self::options_for(workspace, project)?;
        let context = self.context_for(workspace, project)?;
        self.processor.plan(&context, &options).await
    }

    /// Whether the converter executable can be found.
    pub async fn converter_available(&self) -> bool {
        let program = self.config().converter_program();
        let available = self.runner.is_available(&program).await;
        if !available {
            warn!(program = %program, "Converter not found on PATH");
        }
        available
    }
}
