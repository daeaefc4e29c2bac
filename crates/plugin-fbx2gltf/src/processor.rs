//! Batch orchestration: discover inputs, convert them through a bounded
//! worker pool, write the manifest, and aggregate failures.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use meshpipe_core::traits::{CommandRunner, CommandSpec};

use crate::config::ConversionConfig;
use crate::converter::{FileConverter, remove_dir_if_exists};
use crate::discovery::discover_inputs;
use crate::error::ConversionError;
use crate::manifest::generate_manifest;
use crate::metrics::{ConversionMetrics, MetricsSnapshot};
use crate::models::{ConversionOptions, ConversionResult, TaskContext, TaskOutput};

/// The batch conversion processor.
#[derive(Debug, Clone)]
pub struct ConversionProcessor {
    /// Plugin configuration.
    config: ConversionConfig,
    /// Per-file converter.
    converter: FileConverter,
    /// Limits concurrently running converter processes.
    limiter: Arc<Semaphore>,
    /// Conversion metrics collector.
    metrics: Arc<ConversionMetrics>,
}

impl ConversionProcessor {
    /// Create a processor that runs the converter through `runner`.
    pub fn new(config: ConversionConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            converter: FileConverter::new(runner, &config),
            limiter: Arc::new(Semaphore::new(config.max_concurrency.max(1))),
            metrics: Arc::new(ConversionMetrics::new()),
            config,
        }
    }

    /// Run the task for one project.
    ///
    /// Discovery errors, basename collisions, and manifest errors abort the
    /// run. Per-file failures do not; they are collected and reported as a
    /// single [`ConversionError::BatchFailed`] after the manifest for the
    /// successful files has been written.
    #[instrument(skip(self, context, options), fields(project = %context.project_name, run_id = tracing::field::Empty))]
    pub async fn execute(
        &self,
        context: &TaskContext,
        options: &ConversionOptions,
    ) -> Result<TaskOutput, ConversionError> {
        let run_id = Uuid::now_v7();
        tracing::Span::current().record("run_id", run_id.to_string());
        let started_at = Utc::now();

        let inputs = self.discover(context, options).await?;

        let collisions = find_collisions(&inputs);
        if !collisions.is_empty() {
            return Err(ConversionError::BasenameCollision { collisions });
        }

        let dist = context.project_root.join(&self.config.output_dir);
        remove_dir_if_exists(&dist).await?;
        tokio::fs::create_dir_all(&dist).await?;

        info!(
            count = inputs.len(),
            max_concurrency = self.config.max_concurrency,
            "Converting FBX files"
        );

        let run_metrics = Arc::new(ConversionMetrics::new());
        let results = self
            .convert_with(
                inputs,
                &context.project_root,
                options,
                Arc::clone(&run_metrics),
            )
            .await;

        let (succeeded, failed): (Vec<_>, Vec<_>) = results
            .into_iter()
            .partition(ConversionResult::is_success);
        let successes: Vec<PathBuf> = succeeded
            .into_iter()
            .filter_map(|result| match result {
                ConversionResult::Success { output_file } => Some(output_file),
                ConversionResult::Failure { .. } => None,
            })
            .collect();
        let failures: Vec<PathBuf> = failed
            .into_iter()
            .filter_map(|result| match result {
                ConversionResult::Failure { input_file, .. } => Some(input_file),
                ConversionResult::Success { .. } => None,
            })
            .collect();

        let (manifest_path, _) = generate_manifest(
            &successes,
            &context.project_root,
            &self.config.manifest_file,
        )
        .await?;

        let snapshot = run_metrics.snapshot();
        info!(
            converted = successes.len(),
            failed = failures.len(),
            output_bytes = snapshot.total_output_bytes,
            p50_ms = ?snapshot.duration_p50_ms,
            max_ms = ?snapshot.duration_max_ms,
            "Conversion run finished"
        );

        if !failures.is_empty() {
            return Err(ConversionError::BatchFailed { failed: failures });
        }

        Ok(TaskOutput {
            success: true,
            run_id,
            converted: successes.len(),
            manifest_path,
            started_at,
            finished_at: Utc::now(),
            metrics: snapshot,
        })
    }

    /// Discover the task's inputs, relative to the project root.
    pub async fn discover(
        &self,
        context: &TaskContext,
        options: &ConversionOptions,
    ) -> Result<Vec<PathBuf>, ConversionError> {
        let source_dir = context.project_root.join(&options.in_path);
        discover_inputs(&context.project_root, &source_dir, options.pattern()).await
    }

    /// Converter invocations a run would perform, without running them.
    pub async fn plan(
        &self,
        context: &TaskContext,
        options: &ConversionOptions,
    ) -> Result<Vec<CommandSpec>, ConversionError> {
        let inputs = self.discover(context, options).await?;
        let collisions = find_collisions(&inputs);
        if !collisions.is_empty() {
            return Err(ConversionError::BasenameCollision { collisions });
        }
        inputs
            .iter()
            .map(|input| {
                self.converter
                    .command_for(input, &context.project_root, options)
            })
            .collect()
    }

    /// Convert every input concurrently, at most `max_concurrency` at a
    /// time. Never fails as a whole: each input yields a result, in input
    /// order.
    pub async fn convert_all(
        &self,
        inputs: Vec<PathBuf>,
        project_root: &Path,
        options: &ConversionOptions,
    ) -> Vec<ConversionResult> {
        self.convert_with(
            inputs,
            project_root,
            options,
            Arc::new(ConversionMetrics::new()),
        )
        .await
    }

    /// Like [`Self::convert_all`], also recording into `run_metrics`.
    async fn convert_with(
        &self,
        inputs: Vec<PathBuf>,
        project_root: &Path,
        options: &ConversionOptions,
        run_metrics: Arc<ConversionMetrics>,
    ) -> Vec<ConversionResult> {
        let options = Arc::new(options.clone());
        let project_root = Arc::new(project_root.to_path_buf());

        let tasks: Vec<_> = inputs
            .into_iter()
            .map(|input| {
                let converter = self.converter.clone();
                let limiter = Arc::clone(&self.limiter);
                let metrics = Arc::clone(&self.metrics);
                let run_metrics = Arc::clone(&run_metrics);
                let options = Arc::clone(&options);
                let root = Arc::clone(&project_root);
                let task_input = input.clone();

                let handle = tokio::spawn(async move {
                    let _permit = limiter.acquire_owned().await.map_err(|_| {
                        ConversionError::SemaphoreClosed {
                            reason: "worker pool".to_string(),
                        }
                    })?;

                    metrics.record_started();
                    run_metrics.record_started();
                    let start = Instant::now();
                    let output_file = converter
                        .convert(&task_input, &root, &options)
                        .await
                        .inspect_err(|_| {
                            metrics.record_failure(start.elapsed());
                            run_metrics.record_failure(start.elapsed());
                        })?;

                    let size = tokio::fs::metadata(&output_file)
                        .await
                        .map(|m| m.len())
                        .unwrap_or(0);
                    metrics.record_success(start.elapsed(), size);
                    run_metrics.record_success(start.elapsed(), size);
                    Ok::<_, ConversionError>(output_file)
                });
                (input, handle)
            })
            .collect();

        let (inputs, handles): (Vec<_>, Vec<_>) = tasks.into_iter().unzip();
        let joined = join_all(handles).await;

        inputs
            .into_iter()
            .zip(joined)
            .map(|(input, joined)| {
                let outcome = match joined {
                    Ok(result) => result,
                    Err(e) => Err(ConversionError::Join(e)),
                };
                match outcome {
                    Ok(output_file) => ConversionResult::Success { output_file },
                    Err(e) => {
                        error!(input = %input.display(), error = %e, "Error processing file");
                        ConversionResult::Failure {
                            input_file: input,
                            reason: e.to_string(),
                        }
                    }
                }
            })
            .collect()
    }

    /// Get the configuration.
    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Currently free worker slots.
    pub fn available_slots(&self) -> usize {
        self.limiter.available_permits()
    }

    /// Metrics accumulated over every run of this processor.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

/// Inputs that would write to the same `<output_dir>/<basename>`.
pub fn find_collisions(inputs: &[PathBuf]) -> Vec<(String, Vec<PathBuf>)> {
    let mut by_name: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    for input in inputs {
        match FileConverter::output_basename(input) {
            Ok(name) => by_name.entry(name).or_default().push(input.clone()),
            Err(_) => warn!(input = %input.display(), "Input has no usable file name"),
        }
    }
    by_name
        .into_iter()
        .filter(|(_, paths)| paths.len() > 1)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshpipe_core::result::AppResult;
    use meshpipe_core::traits::CommandOutput;

    #[derive(Debug)]
    struct NeverRuns;

    #[async_trait::async_trait]
    impl CommandRunner for NeverRuns {
        async fn run(&self, spec: &CommandSpec) -> AppResult<CommandOutput> {
            panic!("converter should not run: {spec}");
        }
    }

    fn processor() -> ConversionProcessor {
        ConversionProcessor::new(ConversionConfig::default(), Arc::new(NeverRuns))
    }

    #[test]
    fn test_processor_creation() {
        assert_eq!(processor().available_slots(), 4);
        assert_eq!(processor().metrics_snapshot().conversions_started, 0);
    }

    #[test]
    fn test_find_collisions() {
        let inputs = vec![
            PathBuf::from("fbx/a/hero.fbx"),
            PathBuf::from("fbx/b/hero.fbx"),
            PathBuf::from("fbx/villain.fbx"),
        ];
        let collisions = find_collisions(&inputs);
        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].0, "hero");
        assert_eq!(collisions[0].1.len(), 2);
    }

    #[tokio::test]
    async fn test_plan_builds_commands_without_running() {
        let temp = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(temp.path().join("fbx")).expect("mkdir");
        std::fs::write(temp.path().join("fbx/a.fbx"), b"fbx").expect("write");

        let context = TaskContext {
            workspace_root: temp.path().to_path_buf(),
            project_name: "props".to_string(),
            project_root: temp.path().to_path_buf(),
        };
        let plan = processor()
            .plan(&context, &ConversionOptions::new("fbx"))
            .await
            .expect("plan");
        assert_eq!(plan.len(), 1);
        assert_eq!(
            plan[0].to_string(),
            "FBX2glTF --input fbx/a.fbx --output dist/a"
        );
    }

    #[tokio::test]
    async fn test_missing_input_dir_aborts_before_reset() {
        let temp = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(temp.path().join("dist/keep")).expect("mkdir");
        let context = TaskContext {
            workspace_root: temp.path().to_path_buf(),
            project_name: "props".to_string(),
            project_root: temp.path().to_path_buf(),
        };
        let err = processor()
            .execute(&context, &ConversionOptions::new("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConversionError::SourceDirMissing { .. }));
        assert!(temp.path().join("dist/keep").exists());
    }
}
