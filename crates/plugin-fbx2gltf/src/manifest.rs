//! Manifest of produced artifacts.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::discovery::{relative_path, to_slash};
use crate::error::ConversionError;

/// One produced file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Path relative to the project root, `/`-separated.
    pub path: String,
    /// Size in bytes at generation time.
    pub size: u64,
}

/// Stat every output file and write the manifest to
/// `<project_root>/<file_name>`, replacing any previous manifest.
///
/// Entries keep the order of `files`. Any stat or write failure is fatal.
pub async fn generate_manifest(
    files: &[PathBuf],
    project_root: &Path,
    file_name: &str,
) -> Result<(PathBuf, Vec<ManifestEntry>), ConversionError> {
    let mut entries = Vec::with_capacity(files.len());

    for file in files {
        let metadata =
            tokio::fs::metadata(file)
                .await
                .map_err(|source| ConversionError::ManifestStat {
                    path: file.clone(),
                    source,
                })?;

        entries.push(ManifestEntry {
            path: to_slash(&relative_path(file, project_root)),
            size: metadata.len(),
        });
    }

    let destination = project_root.join(file_name);
    let json = serde_json::to_string_pretty(&entries)?;

    tokio::fs::write(&destination, json)
        .await
        .map_err(|source| ConversionError::ManifestWrite {
            path: destination.clone(),
            source,
        })?;

    tracing::info!(
        manifest = %destination.display(),
        entries = entries.len(),
        "Manifest written"
    );

    Ok((destination, entries))
}

/// Read a manifest back.
pub async fn read_manifest(path: &Path) -> Result<Vec<ManifestEntry>, ConversionError> {
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&raw)?)
}
