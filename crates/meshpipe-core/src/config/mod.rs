//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod logging;
pub mod workspace;

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use self::logging::LoggingConfig;
use self::workspace::WorkspaceConfig;

use crate::error::AppError;

pub use self::workspace::ProjectConfig;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Workspace root and projects.
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    /// Per-plugin settings, keyed by plugin name. Each plugin deserializes
    /// its own section.
    #[serde(default)]
    pub plugins: BTreeMap<String, serde_json::Value>,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `MESHPIPE_`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("MESHPIPE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        tracing::debug!(env = %env, "Configuration sources merged");

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Load configuration from a single explicit file.
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path).required(true))
            .build()
            .map_err(|e| {
                AppError::configuration(format!(
                    "Failed to read config '{}': {e}",
                    path.display()
                ))
            })?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Raw settings section for the named plugin.
    pub fn plugin_section(&self, name: &str) -> Option<&serde_json::Value> {
        self.plugins.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ProjectResolver;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").expect("parse");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "pretty");
        assert!(config.workspace.projects.is_empty());
        assert!(config.plugin_section("fbx2gltf").is_none());
    }

    #[test]
    fn test_from_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("meshpipe.toml");
        std::fs::write(
            &path,
            r#"
[logging]
level = "debug"
format = "json"

[workspace]
root = "/srv/game"

[workspace.projects.props]
root = "apps/props"

[plugins.fbx2gltf]
max_concurrency = 2
"#,
        )
        .expect("write");

        let config = AppConfig::from_file(&path).expect("load");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
        assert_eq!(
            config.workspace.resolve_project("props").expect("resolve"),
            std::path::PathBuf::from("/srv/game/apps/props")
        );
        let section = config.plugin_section("fbx2gltf").expect("section");
        assert_eq!(section["max_concurrency"], 2);
    }

    #[test]
    fn test_from_missing_file_is_configuration_error() {
        let err = AppConfig::from_file(Path::new("/nonexistent/meshpipe.toml")).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);
    }
}
