//! `meshpipe check`: verify the converter is installed.

use serde::Serialize;

use meshpipe_core::config::AppConfig;
use meshpipe_core::error::AppError;
use meshpipe_core::result::AppResult;

use crate::output::{self, OutputFormat};

#[derive(Debug, Serialize)]
struct CheckReport {
    converter: String,
    available: bool,
    enabled: bool,
    max_concurrency: usize,
}

/// Execute the check command
pub async fn execute(config: &AppConfig, format: OutputFormat) -> AppResult<()> {
    let executor = super::executor(config)?;
    let settings = executor.config();
    let report = CheckReport {
        converter: settings.converter_program(),
        available: executor.converter_available().await,
        enabled: settings.enabled,
        max_concurrency: settings.max_concurrency,
    };

    match format {
        OutputFormat::Json => output::print_item(&report),
        OutputFormat::Table => {
            if report.available {
                output::print_success(&format!("Converter '{}' found", report.converter));
            } else {
                output::print_warning(&format!("Converter '{}' not found", report.converter));
            }
            output::print_kv("Enabled", &report.enabled.to_string());
            output::print_kv("Max concurrency", &report.max_concurrency.to_string());
        }
    }

    if report.available {
        Ok(())
    } else {
        Err(AppError::external_command(format!(
            "Converter '{}' is not installed or not on PATH",
            report.converter
        )))
    }
}
