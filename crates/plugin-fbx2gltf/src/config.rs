//! Configuration for the FBX2glTF conversion plugin.
//!
//! Read from the `[plugins.fbx2gltf]` section of the workspace
//! configuration. Every field has a default, so an absent section is valid.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::ConversionError;

/// Plugin-level settings shared by every project that runs the task.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Converter executable: a name looked up on PATH or an explicit path.
    pub converter_path: PathBuf,

    /// Maximum number of converter processes running at once.
    #[validate(range(min = 1, max = 64))]
    pub max_concurrency: usize,

    /// Output root directory name, relative to the project root.
    #[validate(length(min = 1))]
    pub output_dir: String,

    /// Manifest file name, written at the project root.
    #[validate(length(min = 1))]
    pub manifest_file: String,

    /// Whether to capture converter stdout/stderr for diagnostics.
    pub capture_output: bool,

    /// Whether the plugin is enabled.
    pub enabled: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            converter_path: PathBuf::from("FBX2glTF"),
            max_concurrency: default_max_concurrency(),
            output_dir: "dist".to_string(),
            manifest_file: "manifest.json".to_string(),
            capture_output: true,
            enabled: true,
        }
    }
}

fn default_max_concurrency() -> usize {
    4
}

impl ConversionConfig {
    /// Build from the raw plugin section, falling back to defaults when the
    /// section is absent.
    pub fn from_section(section: Option<&serde_json::Value>) -> Result<Self, ConversionError> {
        let config = match section {
            Some(value) => serde_json::from_value::<Self>(value.clone())
                .map_err(|e| ConversionError::InvalidOptions(format!("[plugins.fbx2gltf]: {e}")))?,
            None => Self::default(),
        };
        config
            .validate()
            .map_err(|e| ConversionError::InvalidOptions(e.to_string()))?;
        Ok(config)
    }

    /// Converter program as a string for process spawning.
    pub fn converter_program(&self) -> String {
        self.converter_path.to_string_lossy().into_owned()
    }
}
