//! `meshpipe projects`: list configured projects.

use serde::Serialize;
use tabled::Tabled;

use meshpipe_core::config::AppConfig;
use meshpipe_core::error::AppError;
use meshpipe_core::result::AppResult;
use meshpipe_core::traits::ProjectResolver;
use plugin_fbx2gltf::plugin::TARGET_NAME;

use crate::output::{self, OutputFormat};

#[derive(Debug, Serialize, Tabled)]
struct ProjectRow {
    #[tabled(rename = "Project")]
    name: String,
    #[tabled(rename = "Root")]
    root: String,
    #[tabled(rename = "fbx2gltf")]
    has_target: bool,
    #[tabled(rename = "Input")]
    in_path: String,
}

/// Execute the projects command
pub fn execute(config: &AppConfig, format: OutputFormat) -> AppResult<()> {
    let workspace = &config.workspace;
    let rows = workspace
        .project_names()
        .into_iter()
        .map(|name| {
            let root = workspace.resolve_project(&name)?;
            let target = workspace.target_options(&name, TARGET_NAME).ok();
            let in_path = target
                .and_then(|t| t.get("in_path").or_else(|| t.get("inPath")))
                .and_then(|v| v.as_str())
                .unwrap_or("-")
                .to_string();
            Ok::<_, AppError>(ProjectRow {
                has_target: target.is_some(),
                root: root.display().to_string(),
                in_path,
                name,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    output::print_list(&rows, format);
    Ok(())
}
