//! `meshpipe run`: convert one project's FBX files.

use std::sync::Arc;

use clap::Args;

use meshpipe_core::config::AppConfig;
use meshpipe_core::error::AppError;
use meshpipe_core::result::AppResult;
use plugin_fbx2gltf::plugin::TARGET_NAME;
use plugin_fbx2gltf::{ConversionConfig, Fbx2GltfExecutor, ProcessCommandRunner};

use crate::output::{self, OutputFormat};

/// Arguments for the run command
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Project to convert
    pub project: String,

    /// Override the configured worker pool size
    #[arg(long)]
    pub max_concurrency: Option<usize>,
}

/// Execute the run command
pub async fn execute(args: &RunArgs, config: &AppConfig, format: OutputFormat) -> AppResult<()> {
    let mut section = config
        .plugin_section(TARGET_NAME)
        .cloned()
        .unwrap_or_else(|| serde_json::json!({}));
    if let (Some(limit), Some(table)) = (args.max_concurrency, section.as_object_mut()) {
        table.insert("max_concurrency".to_string(), limit.into());
    }

    let settings = ConversionConfig::from_section(Some(&section))?;
    let executor = Fbx2GltfExecutor::new(settings, Arc::new(ProcessCommandRunner::new()));

    let result = executor
        .execute_target(&config.workspace, &args.project)
        .await
        .map_err(AppError::from)?;

    match format {
        OutputFormat::Json => output::print_item(&result),
        OutputFormat::Table => {
            output::print_success(&format!(
                "Converted {} file(s) for '{}'",
                result.converted, args.project
            ));
            output::print_kv("Run", &result.run_id.to_string());
            output::print_kv("Manifest", &result.manifest_path.display().to_string());
            let elapsed = result.finished_at - result.started_at;
            output::print_kv("Elapsed", &format!("{} ms", elapsed.num_milliseconds()));
        }
    }
    Ok(())
}
