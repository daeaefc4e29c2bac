//! `meshpipe plan`: print the converter commands without running them.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use meshpipe_core::config::AppConfig;
use meshpipe_core::error::AppError;
use meshpipe_core::result::AppResult;

use crate::output::{self, OutputFormat};

/// Arguments for the plan command
#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Project to plan
    pub project: String,
}

#[derive(Debug, Serialize, Tabled)]
struct PlanRow {
    #[tabled(rename = "Working directory")]
    cwd: String,
    #[tabled(rename = "Command")]
    command: String,
}

/// Execute the plan command
pub async fn execute(args: &PlanArgs, config: &AppConfig, format: OutputFormat) -> AppResult<()> {
    let executor = super::executor(config)?;
    let commands = executor
        .plan_target(&config.workspace, &args.project)
        .await
        .map_err(AppError::from)?;

    let rows: Vec<PlanRow> = commands
        .iter()
        .map(|spec| PlanRow {
            cwd: spec.cwd.display().to_string(),
            command: spec.to_string(),
        })
        .collect();
    output::print_list(&rows, format);
    Ok(())
}
