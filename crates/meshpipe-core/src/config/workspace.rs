//! Workspace layout: where the workspace lives and which projects it has.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::result::AppResult;
use crate::traits::ProjectResolver;

/// Workspace root and project registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Workspace root; relative paths resolve against the current directory.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Registered projects keyed by name.
    #[serde(default)]
    pub projects: BTreeMap<String, ProjectConfig>,
}

/// A single project inside the workspace.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project root, relative to the workspace root.
    pub root: PathBuf,
    /// Task targets keyed by target name; each value is the raw option table
    /// handed to the plugin that owns the target.
    #[serde(default)]
    pub targets: BTreeMap<String, serde_json::Value>,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            projects: BTreeMap::new(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

impl WorkspaceConfig {
    /// Look up a project by name.
    pub fn project(&self, name: &str) -> AppResult<&ProjectConfig> {
        self.projects
            .get(name)
            .ok_or_else(|| AppError::not_found(format!("Project '{name}' is not defined")))
    }

    /// Raw options of a project's target, if the project defines it.
    pub fn target_options(&self, project: &str, target: &str) -> AppResult<&serde_json::Value> {
        self.project(project)?.targets.get(target).ok_or_else(|| {
            AppError::not_found(format!(
                "Project '{project}' has no '{target}' target"
            ))
        })
    }
}

fn absolutize(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

impl ProjectResolver for WorkspaceConfig {
    fn workspace_root(&self) -> PathBuf {
        absolutize(&self.root)
    }

    fn resolve_project(&self, name: &str) -> AppResult<PathBuf> {
        let project = self.project(name)?;
        Ok(self.workspace_root().join(&project.root))
    }

    fn project_names(&self) -> Vec<String> {
        self.projects.keys().cloned().collect()
    }
}
