//! Workspace/project path resolution.

use std::path::PathBuf;

use crate::result::AppResult;

/// Resolves project names to their root directories.
pub trait ProjectResolver: Send + Sync + std::fmt::Debug {
    /// Absolute root of the workspace all projects live in.
    fn workspace_root(&self) -> PathBuf;

    /// Absolute root directory of the named project.
    ///
    /// Returns a `NotFound` error when the project is not registered.
    fn resolve_project(&self, name: &str) -> AppResult<PathBuf>;

    /// Names of all registered projects, sorted.
    fn project_names(&self) -> Vec<String>;
}
