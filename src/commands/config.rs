//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use meshpipe_core::config::AppConfig;
use meshpipe_core::error::AppError;
use meshpipe_core::result::AppResult;
use plugin_fbx2gltf::Fbx2GltfExecutor;
use plugin_fbx2gltf::plugin::TARGET_NAME;

use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Validate plugin settings and every project's fbx2gltf target
    Validate,
}

/// Execute config commands
pub fn execute(
    args: &ConfigArgs,
    source: &str,
    config: AppResult<AppConfig>,
    format: OutputFormat,
) -> AppResult<()> {
    let config = config.inspect_err(|e| {
        output::print_error(&format!("Configuration '{source}' could not be loaded"));
        tracing::debug!(error = %e, "Configuration load failed");
    })?;

    match &args.command {
        ConfigCommand::Show => output::print_item(&config),
        ConfigCommand::Validate => validate(&config, source, format)?,
    }
    Ok(())
}

fn validate(config: &AppConfig, source: &str, format: OutputFormat) -> AppResult<()> {
    let executor = super::executor(config)?;

    let mut problems = Vec::new();
    let mut checked = 0;
    for (name, project) in &config.workspace.projects {
        if !project.targets.contains_key(TARGET_NAME) {
            continue;
        }
        checked += 1;
        if let Err(e) = Fbx2GltfExecutor::options_for(&config.workspace, name) {
            problems.push(format!("{name}: {e}"));
        }
    }

    if !problems.is_empty() {
        for problem in &problems {
            output::print_error(problem);
        }
        return Err(AppError::validation(format!(
            "{} project target(s) have invalid options",
            problems.len()
        )));
    }

    match format {
        OutputFormat::Json => output::print_item(&serde_json::json!({
            "valid": true,
            "projects_checked": checked,
            "converter": executor.config().converter_program(),
        })),
        OutputFormat::Table => {
            output::print_success(&format!("Configuration '{source}' is valid"));
            output::print_kv("Projects", &config.workspace.projects.len().to_string());
            output::print_kv("fbx2gltf targets", &checked.to_string());
            output::print_kv("Converter", &executor.config().converter_program());
        }
    }
    Ok(())
}
