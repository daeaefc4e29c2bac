//! Single-file conversion: run the converter, then move its output into
//! place.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use meshpipe_core::traits::{CommandRunner, CommandSpec};

use crate::config::ConversionConfig;
use crate::error::ConversionError;
use crate::flags::build_args;
use crate::models::ConversionOptions;

/// Suffix the converter appends to its output directory.
pub const OUTPUT_SUFFIX: &str = "_out";

/// Converts one input file at a time.
#[derive(Debug, Clone)]
pub struct FileConverter {
    /// Host command runner.
    runner: Arc<dyn CommandRunner>,
    /// Converter executable.
    program: String,
    /// Output root, relative to the project root.
    output_dir: String,
    /// Whether converter output is captured.
    capture_output: bool,
}

impl FileConverter {
    /// Create a converter from plugin settings.
    pub fn new(runner: Arc<dyn CommandRunner>, config: &ConversionConfig) -> Self {
        Self {
            runner,
            program: config.converter_program(),
            output_dir: config.output_dir.clone(),
            capture_output: config.capture_output,
        }
    }

    /// Output name for an input: its file name without the extension.
    pub fn output_basename(input: &Path) -> Result<String, ConversionError> {
        input
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ConversionError::NoFileStem {
                path: input.to_path_buf(),
            })
    }

    /// Converter invocation for one input, relative to `project_root`.
    pub fn command_for(
        &self,
        input: &Path,
        project_root: &Path,
        options: &ConversionOptions,
    ) -> Result<CommandSpec, ConversionError> {
        let basename = Self::output_basename(input)?;
        let output_prefix = Path::new(&self.output_dir).join(&basename);

        Ok(CommandSpec::new(&self.program, project_root)
            .args(build_args(input, &output_prefix, options))
            .capture_output(self.capture_output))
    }

    /// Convert `input` (relative to `project_root`).
    ///
    /// On success returns the absolute path of the produced glTF file inside
    /// `<output_dir>/<basename>/`. On failure the converter's `_out`
    /// directory is removed before the error is returned.
    pub async fn convert(
        &self,
        input: &Path,
        project_root: &Path,
        options: &ConversionOptions,
    ) -> Result<PathBuf, ConversionError> {
        let basename = Self::output_basename(input)
            .map_err(|e| ConversionError::for_input(input, e))?;
        let dist = project_root.join(&self.output_dir);
        let from_dir = dist.join(format!("{basename}{OUTPUT_SUFFIX}"));
        let to_dir = dist.join(&basename);

        let spec = self
            .command_for(input, project_root, options)
            .map_err(|e| ConversionError::for_input(input, e))?;

        if options.verbose {
            info!(command = %spec, "Running converter");
        } else {
            debug!(command = %spec, "Running converter");
        }

        match self.run_and_move(&spec, &from_dir, &to_dir).await {
            Ok(()) => Ok(to_dir.join(format!("{basename}.{}", options.output_extension()))),
            Err(e) => {
                if let Err(cleanup) = remove_dir_if_exists(&from_dir).await {
                    warn!(
                        dir = %from_dir.display(),
                        error = %cleanup,
                        "Failed to remove partial converter output"
                    );
                }
                Err(ConversionError::for_input(input, e))
            }
        }
    }

    async fn run_and_move(
        &self,
        spec: &CommandSpec,
        from_dir: &Path,
        to_dir: &Path,
    ) -> Result<(), ConversionError> {
        let output = self.runner.run(spec).await?;

        if !output.success {
            return Err(match output.exit_code {
                Some(code) => ConversionError::ConverterFailed {
                    code,
                    stderr: output.stderr.trim().to_string(),
                },
                None => ConversionError::ConverterKilled,
            });
        }

        if !tokio::fs::metadata(from_dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
        {
            return Err(ConversionError::OutputMissing {
                path: from_dir.to_path_buf(),
            });
        }

        remove_dir_if_exists(to_dir).await?;
        tokio::fs::rename(from_dir, to_dir).await?;
        Ok(())
    }
}

/// Recursively remove a directory, treating absence as success.
pub async fn remove_dir_if_exists(path: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
