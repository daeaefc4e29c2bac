//! Input discovery: expand a glob under the task's input directory.

use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern};
use walkdir::WalkDir;

use crate::error::ConversionError;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Find files under `source_dir` matching `pattern`, returned relative to
/// `project_root` and sorted.
///
/// The pattern is matched against each file's path relative to
/// `source_dir`.
pub async fn discover_inputs(
    project_root: &Path,
    source_dir: &Path,
    pattern: &str,
) -> Result<Vec<PathBuf>, ConversionError> {
    let root = project_root.to_path_buf();
    let dir = source_dir.to_path_buf();
    let pattern = pattern.to_string();

    tokio::task::spawn_blocking(move || scan_inputs(&root, &dir, &pattern)).await?
}

/// Blocking implementation of [`discover_inputs`].
pub fn scan_inputs(
    project_root: &Path,
    source_dir: &Path,
    pattern: &str,
) -> Result<Vec<PathBuf>, ConversionError> {
    let matcher = Pattern::new(pattern).map_err(|source| ConversionError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let source_dir = normalize(source_dir);
    if !source_dir.is_dir() {
        return Err(ConversionError::SourceDirMissing { path: source_dir });
    }
    let project_root = normalize(project_root);

    let mut files = Vec::new();
    for entry in WalkDir::new(&source_dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(within) = entry.path().strip_prefix(&source_dir) else {
            continue;
        };
        if matcher.matches_path_with(within, MATCH_OPTIONS) {
            files.push(relative_path(entry.path(), &project_root));
        }
    }

    files.sort();
    tracing::debug!(
        dir = %source_dir.display(),
        pattern = %pattern,
        count = files.len(),
        "Discovered input files"
    );
    Ok(files)
}

/// Lexically resolve `.` and `..` components. Leading `..` components are
/// kept; `..` at a root stays at the root.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    out
}

/// Express `path` relative to `base`, walking up with `..` where needed.
///
/// Both paths are normalized lexically first; the filesystem is not
/// consulted.
pub fn relative_path(path: &Path, base: &Path) -> PathBuf {
    let path = normalize(path);
    let base = normalize(base);

    let path_parts: Vec<Component<'_>> = path.components().collect();
    let base_parts: Vec<Component<'_>> = base.components().collect();

    let common = path_parts
        .iter()
        .zip(base_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in common..base_parts.len() {
        rel.push("..");
    }
    for part in &path_parts[common..] {
        rel.push(part);
    }
    rel
}

/// Render a relative path with `/` separators for manifests and logs.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(path, b"fbx").expect("write");
    }

    #[test]
    fn test_scan_recursive_default_pattern() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path();
        touch(&root.join("assets/a.fbx"));
        touch(&root.join("assets/chars/b.fbx"));
        touch(&root.join("assets/readme.txt"));
        touch(&root.join("other/c.fbx"));

        let files = scan_inputs(root, &root.join("assets"), "**/*.fbx").expect("scan");
        assert_eq!(
            files,
            vec![
                PathBuf::from("assets/a.fbx"),
                PathBuf::from("assets/chars/b.fbx"),
            ]
        );
    }

    #[test]
    fn test_scan_top_level_only_pattern() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path();
        touch(&root.join("fbx/a.fbx"));
        touch(&root.join("fbx/nested/b.fbx"));

        let files = scan_inputs(root, &root.join("fbx"), "*.fbx").expect("scan");
        assert_eq!(files, vec![PathBuf::from("fbx/a.fbx")]);
    }

    #[test]
    fn test_missing_source_dir() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = scan_inputs(temp.path(), &temp.path().join("nope"), "**/*.fbx").unwrap_err();
        assert!(matches!(err, ConversionError::SourceDirMissing { .. }));
    }

    #[test]
    fn test_invalid_pattern() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = scan_inputs(temp.path(), temp.path(), "***.fbx").unwrap_err();
        assert!(matches!(err, ConversionError::InvalidPattern { .. }));
    }

    #[tokio::test]
    async fn test_discover_async() {
        let temp = tempfile::tempdir().expect("tempdir");
        touch(&temp.path().join("in/x.fbx"));
        let files = discover_inputs(temp.path(), &temp.path().join("in"), "**/*.fbx")
            .await
            .expect("discover");
        assert_eq!(files, vec![PathBuf::from("in/x.fbx")]);
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(
            relative_path(Path::new("/w/app/dist/a/a.gltf"), Path::new("/w/app")),
            PathBuf::from("dist/a/a.gltf")
        );
        assert_eq!(
            relative_path(Path::new("/w/shared/fbx/a.fbx"), Path::new("/w/app")),
            PathBuf::from("../shared/fbx/a.fbx")
        );
        assert_eq!(
            relative_path(Path::new("/w/app/./fbx/../fbx/a.fbx"), Path::new("/w/app")),
            PathBuf::from("fbx/a.fbx")
        );
    }

    #[test]
    fn test_normalize_keeps_leading_parent_dirs() {
        assert_eq!(normalize(Path::new("../../x")), PathBuf::from("../../x"));
        assert_eq!(normalize(Path::new("a/../../b")), PathBuf::from("../b"));
        assert_eq!(normalize(Path::new("./a/./b/..")), PathBuf::from("a"));
    }

    #[test]
    fn test_normalize_stops_at_root() {
        assert_eq!(normalize(Path::new("/..")), PathBuf::from("/"));
        assert_eq!(normalize(Path::new("/w/../../x")), PathBuf::from("/x"));
    }

    #[test]
    fn test_relative_path_from_relative_root() {
        assert_eq!(
            relative_path(Path::new("../../proj/fbx/a.fbx"), Path::new("../../proj")),
            PathBuf::from("fbx/a.fbx")
        );
    }

    #[test]
    fn test_scan_skips_dot_entries() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path();
        touch(&root.join("fbx/a.fbx"));
        touch(&root.join("fbx/.cache/b.fbx"));
        touch(&root.join("fbx/nested/.backup/c.fbx"));
        touch(&root.join("fbx/.hidden.fbx"));

        let files = scan_inputs(root, &root.join("fbx"), "**/*.fbx").expect("scan");
        assert_eq!(files, vec![PathBuf::from("fbx/a.fbx")]);
    }

    #[test]
    fn test_to_slash() {
        let p: PathBuf = ["dist", "a", "a.gltf"].iter().collect();
        assert_eq!(to_slash(&p), "dist/a/a.gltf");
    }
}
