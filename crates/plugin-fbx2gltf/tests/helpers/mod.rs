//! Shared helpers for plugin integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use meshpipe_core::result::AppResult;
use meshpipe_core::traits::{CommandOutput, CommandRunner, CommandSpec};
use plugin_fbx2gltf::{ConversionConfig, ConversionProcessor, TaskContext};

/// Stand-in for the converter binary.
///
/// Writes `<output>_out/<stem>.gltf` for every invocation. Inputs whose
/// stem is listed in `failing` leave that partial output behind and exit 1.
#[derive(Debug, Default)]
pub struct FakeConverter {
    failing: HashSet<String>,
    delay: Duration,
    calls: Mutex<Vec<CommandSpec>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, stems: &[&str]) -> Self {
        self.failing = stems.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().expect("lock").clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn arg_after(spec: &CommandSpec, flag: &str) -> String {
        let index = spec
            .args
            .iter()
            .position(|a| a == flag)
            .unwrap_or_else(|| panic!("{flag} missing from {spec}"));
        spec.args[index + 1].clone()
    }
}

#[async_trait]
impl CommandRunner for FakeConverter {
    async fn run(&self, spec: &CommandSpec) -> AppResult<CommandOutput> {
        self.calls.lock().expect("lock").push(spec.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let prefix = Self::arg_after(spec, "--output");
        let stem = Path::new(&prefix)
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        let out_dir = spec.cwd.join(format!("{prefix}_out"));
        std::fs::create_dir_all(&out_dir)?;
        // Output size varies with the name so manifest sizes are checkable.
        std::fs::write(out_dir.join(format!("{stem}.gltf")), stem.repeat(3))?;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(&stem) {
            Ok(CommandOutput::failed(1, "Could not parse FBX file"))
        } else {
            Ok(CommandOutput::succeeded())
        }
    }
}

/// A project directory with FBX inputs under `fbx/`.
pub struct TestProject {
    pub dir: tempfile::TempDir,
}

impl TestProject {
    pub fn with_inputs(inputs: &[&str]) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        for input in inputs {
            let path = dir.path().join("fbx").join(input);
            std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
            std::fs::write(&path, b"Kaydara FBX Binary").expect("write input");
        }
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn context(&self) -> TaskContext {
        TaskContext {
            workspace_root: self.root().to_path_buf(),
            project_name: "props".to_string(),
            project_root: self.root().to_path_buf(),
        }
    }
}

pub fn processor(runner: Arc<FakeConverter>, max_concurrency: usize) -> ConversionProcessor {
    let config = ConversionConfig {
        max_concurrency,
        ..ConversionConfig::default()
    };
    ConversionProcessor::new(config, runner)
}
