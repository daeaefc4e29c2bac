//! Unified error type for the FBX2glTF conversion plugin.
//!
//! All subsystem errors (discovery, process execution, directory moves,
//! manifest generation) are consolidated into a single `ConversionError`
//! enum that maps cleanly to `meshpipe_core::error::AppError`.

use std::path::PathBuf;

use meshpipe_core::error::AppError;
use thiserror::Error;

/// Unified error type for all conversion operations.
#[derive(Debug, Error)]
pub enum ConversionError {
    // --- Discovery errors ---
    /// The task input directory does not exist.
    #[error("Input directory does not exist: {path}")]
    SourceDirMissing {
        /// The resolved input directory.
        path: PathBuf,
    },

    /// The discovery glob could not be parsed.
    #[error("Invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Parser error.
        #[source]
        source: glob::PatternError,
    },

    /// Directory traversal failed.
    #[error("Failed to scan input directory: {0}")]
    Discovery(#[from] walkdir::Error),

    /// Distinct inputs derive the same output directory.
    #[error("{}", describe_collisions(.collisions))]
    BasenameCollision {
        /// Colliding basenames and the inputs that share them.
        collisions: Vec<(String, Vec<PathBuf>)>,
    },

    // --- Per-file conversion errors ---
    /// The input path has no usable file stem.
    #[error("Cannot derive an output name from: {path}")]
    NoFileStem {
        /// The input path.
        path: PathBuf,
    },

    /// The converter exited with a non-zero status.
    #[error("FBX2glTF exited with code {code}: {stderr}")]
    ConverterFailed {
        /// The exit code.
        code: i32,
        /// Captured stderr output (truncated).
        stderr: String,
    },

    /// The converter was terminated by a signal.
    #[error("FBX2glTF was killed (signal termination)")]
    ConverterKilled,

    /// The converter reported success but its output directory is absent.
    #[error("Converter output not created: {path}")]
    OutputMissing {
        /// Expected `_out` directory.
        path: PathBuf,
    },

    /// A single file failed; wraps the underlying cause.
    #[error("Failed to convert {input}: {source}")]
    FileConversion {
        /// Input path relative to the project root.
        input: PathBuf,
        /// Underlying cause.
        #[source]
        source: Box<ConversionError>,
    },

    // --- Manifest errors ---
    /// An output file could not be stat'ed for the manifest.
    #[error("Failed to stat output file {path}: {source}")]
    ManifestStat {
        /// The output file.
        path: PathBuf,
        /// I/O cause.
        #[source]
        source: std::io::Error,
    },

    /// The manifest could not be written.
    #[error("Failed to write manifest {path}: {source}")]
    ManifestWrite {
        /// Manifest destination.
        path: PathBuf,
        /// I/O cause.
        #[source]
        source: std::io::Error,
    },

    // --- Batch errors ---
    /// One or more files failed to convert.
    #[error("{}", describe_failures(.failed))]
    BatchFailed {
        /// Every failed input, relative to the project root.
        failed: Vec<PathBuf>,
    },

    // --- Task setup errors ---
    /// Task options were missing or invalid.
    #[error("Invalid task options: {0}")]
    InvalidOptions(String),

    /// The project does not define an `fbx2gltf` target.
    #[error("Project '{project}' has no '{target}' target")]
    MissingTarget {
        /// Project name.
        project: String,
        /// Target name.
        target: String,
    },

    /// The plugin is disabled in configuration.
    #[error("The fbx2gltf plugin is disabled")]
    Disabled,

    /// Worker pool semaphore was closed unexpectedly.
    #[error("Internal semaphore error: {reason}")]
    SemaphoreClosed {
        /// Description of which semaphore failed.
        reason: String,
    },

    // --- Generic errors ---
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Tokio task join error.
    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// Error reported by a host service.
    #[error(transparent)]
    Host(#[from] AppError),
}

impl ConversionError {
    /// Wrap an error as the failure of one input file.
    pub fn for_input(input: impl Into<PathBuf>, source: ConversionError) -> Self {
        Self::FileConversion {
            input: input.into(),
            source: Box::new(source),
        }
    }
}

fn describe_failures(failed: &[PathBuf]) -> String {
    let mut lines = vec![format!(
        "Error: {} file(s) could not be processed:",
        failed.len()
    )];
    lines.extend(failed.iter().map(|f| format!("  - {}", f.display())));
    lines.join("\n")
}

fn describe_collisions(collisions: &[(String, Vec<PathBuf>)]) -> String {
    let mut lines = vec![format!(
        "{} output name(s) are claimed by more than one input:",
        collisions.len()
    )];
    for (basename, inputs) in collisions {
        let names: Vec<String> = inputs.iter().map(|p| p.display().to_string()).collect();
        lines.push(format!("  - {}: {}", basename, names.join(", ")));
    }
    lines.join("\n")
}

impl From<ConversionError> for AppError {
    fn from(err: ConversionError) -> Self {
        match err {
            ConversionError::Host(inner) => inner,
            ConversionError::SourceDirMissing { .. } | ConversionError::MissingTarget { .. } => {
                AppError::not_found(err.to_string())
            }
            ConversionError::InvalidPattern { .. } | ConversionError::InvalidOptions(_) => {
                AppError::validation(err.to_string())
            }
            ConversionError::BasenameCollision { .. } => AppError::conflict(err.to_string()),
            ConversionError::Disabled => AppError::configuration(err.to_string()),
            ConversionError::ConverterFailed { .. } | ConversionError::ConverterKilled => {
                AppError::external_command(err.to_string())
            }
            ConversionError::Discovery(_)
            | ConversionError::ManifestStat { .. }
            | ConversionError::ManifestWrite { .. }
            | ConversionError::Io(_) => AppError::storage(err.to_string()),
            _ => AppError::plugin(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshpipe_core::error::ErrorKind;

    #[test]
    fn test_batch_failed_lists_every_input() {
        let err = ConversionError::BatchFailed {
            failed: vec![PathBuf::from("assets/b.fbx"), PathBuf::from("assets/c.fbx")],
        };
        assert_eq!(
            err.to_string(),
            "Error: 2 file(s) could not be processed:\n  - assets/b.fbx\n  - assets/c.fbx"
        );
    }

    #[test]
    fn test_file_conversion_wraps_cause() {
        let err = ConversionError::for_input(
            "assets/b.fbx",
            ConversionError::ConverterFailed {
                code: 2,
                stderr: "bad fbx".to_string(),
            },
        );
        let msg = err.to_string();
        assert!(msg.contains("assets/b.fbx"));
        assert!(msg.contains("code 2"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_collision_message() {
        let err = ConversionError::BasenameCollision {
            collisions: vec![(
                "hero".to_string(),
                vec![PathBuf::from("a/hero.fbx"), PathBuf::from("b/hero.fbx")],
            )],
        };
        assert!(err.to_string().contains("hero: a/hero.fbx, b/hero.fbx"));
    }

    #[test]
    fn test_app_error_mapping() {
        let app: AppError = ConversionError::BasenameCollision {
            collisions: Vec::new(),
        }
        .into();
        assert_eq!(app.kind, ErrorKind::Conflict);

        let app: AppError = ConversionError::InvalidOptions("in_path".to_string()).into();
        assert_eq!(app.kind, ErrorKind::Validation);

        let app: AppError = ConversionError::BatchFailed { failed: Vec::new() }.into();
        assert_eq!(app.kind, ErrorKind::Plugin);

        let app: AppError = ConversionError::Host(AppError::not_found("props")).into();
        assert_eq!(app.kind, ErrorKind::NotFound);
    }
}
