//! CLI command definitions and dispatch.

pub mod check;
pub mod config;
pub mod plan;
pub mod projects;
pub mod run;

use std::path::Path;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use meshpipe_core::config::AppConfig;
use meshpipe_core::error::AppError;
use meshpipe_core::result::AppResult;
use plugin_fbx2gltf::{Fbx2GltfExecutor, ProcessCommandRunner};

use crate::output::OutputFormat;

/// meshpipe: batch FBX to glTF conversion for workspace projects
#[derive(Debug, Parser)]
#[command(name = "meshpipe", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment (`config/<env>.toml`) or a path to a TOML file
    #[arg(short, long, default_value = "development")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Convert a project's FBX files
    Run(run::RunArgs),
    /// Show the converter commands a run would execute
    Plan(plan::PlanArgs),
    /// List configured projects
    Projects,
    /// Check that the converter is installed
    Check,
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppResult<AppConfig>) -> AppResult<()> {
        if let Commands::Config(args) = &self.command {
            return config::execute(args, &self.config, config, self.format);
        }

        let config = config?;
        match &self.command {
            Commands::Run(args) => run::execute(args, &config, self.format).await,
            Commands::Plan(args) => plan::execute(args, &config, self.format).await,
            Commands::Projects => projects::execute(&config, self.format),
            Commands::Check => check::execute(&config, self.format).await,
            Commands::Config(_) => Ok(()),
        }
    }
}

/// Load configuration from an explicit file or an environment name.
pub fn load_config(config: &str) -> AppResult<AppConfig> {
    let path = Path::new(config);
    if path.is_file() {
        AppConfig::from_file(path)
    } else {
        AppConfig::load(config)
    }
}

/// Build the plugin executor backed by real child processes.
pub fn executor(config: &AppConfig) -> AppResult<Fbx2GltfExecutor> {
    Fbx2GltfExecutor::from_app_config(config, Arc::new(ProcessCommandRunner::new()))
        .map_err(AppError::from)
}
