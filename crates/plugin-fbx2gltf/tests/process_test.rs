//! End-to-end run through a real child process.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::sync::Arc;

use plugin_fbx2gltf::manifest::read_manifest;
use plugin_fbx2gltf::{
    ConversionConfig, ConversionError, ConversionOptions, ConversionProcessor,
    ProcessCommandRunner, TaskContext,
};

const FAKE_CONVERTER: &str = r#"#!/bin/sh
while [ $# -gt 0 ]; do
  case "$1" in
    --input) in="$2"; shift 2 ;;
    --output) out="$2"; shift 2 ;;
    *) shift ;;
  esac
done
mkdir -p "${out}_out"
case "$in" in
  *broken*) echo "cannot parse $in" >&2; exit 2 ;;
esac
printf 'gltf' > "${out}_out/$(basename "$out").gltf"
"#;

#[tokio::test]
async fn test_process_runner_end_to_end() {
    let tools = tempfile::tempdir().expect("tempdir");
    let script = tools.path().join("fake-fbx2gltf");
    std::fs::write(&script, FAKE_CONVERTER).expect("write script");
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).expect("chmod");

    let project = tempfile::tempdir().expect("tempdir");
    std::fs::create_dir_all(project.path().join("fbx")).expect("mkdir");
    std::fs::write(project.path().join("fbx/good.fbx"), b"fbx").expect("write");
    std::fs::write(project.path().join("fbx/broken.fbx"), b"fbx").expect("write");

    let config = ConversionConfig {
        converter_path: script,
        ..ConversionConfig::default()
    };
    let processor = ConversionProcessor::new(config, Arc::new(ProcessCommandRunner::new()));
    let context = TaskContext {
        workspace_root: project.path().to_path_buf(),
        project_name: "props".to_string(),
        project_root: project.path().to_path_buf(),
    };

    let err = processor
        .execute(&context, &ConversionOptions::new("fbx"))
        .await
        .unwrap_err();
    assert!(matches!(err, ConversionError::BatchFailed { .. }));
    assert!(err.to_string().contains("fbx/broken.fbx"));

    assert!(project.path().join("dist/good/good.gltf").is_file());
    assert!(!project.path().join("dist/broken").exists());
    assert!(!project.path().join("dist/broken_out").exists());

    let manifest = read_manifest(&project.path().join("manifest.json"))
        .await
        .expect("manifest");
    assert_eq!(manifest.len(), 1);
    assert_eq!(manifest[0].path, "dist/good/good.gltf");
    assert_eq!(manifest[0].size, 4);

    let metrics = processor.metrics_snapshot();
    assert_eq!(metrics.conversions_succeeded, 1);
    assert_eq!(metrics.conversions_failed, 1);
}
