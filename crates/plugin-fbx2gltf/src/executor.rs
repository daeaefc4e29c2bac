//! Process-backed command runner.
//!
//! Runs external commands as child processes and captures their output.

use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, error};

use meshpipe_core::error::AppError;
use meshpipe_core::result::AppResult;
use meshpipe_core::traits::{CommandOutput, CommandRunner, CommandSpec};

/// Maximum number of stderr characters kept in error messages.
const MAX_STDERR_CHARS: usize = 2000;

/// Runs commands with `tokio::process`.
#[derive(Debug, Clone, Default)]
pub struct ProcessCommandRunner;

impl ProcessCommandRunner {
    /// Create a new runner.
    pub fn new() -> Self {
        Self
    }
}

async fn read_all<R: tokio::io::AsyncRead + Unpin>(reader: Option<R>) -> String {
    match reader {
        Some(mut r) => {
            let mut buf = Vec::new();
            if let Err(e) = r.read_to_end(&mut buf).await {
                debug!(error = %e, "Failed to read child output pipe");
            }
            String::from_utf8_lossy(&buf).into_owned()
        }
        None => String::new(),
    }
}

#[async_trait]
impl CommandRunner for ProcessCommandRunner {
    async fn run(&self, spec: &CommandSpec) -> AppResult<CommandOutput> {
        let mut cmd = Command::new(&spec.program);

        let (stdout_cfg, stderr_cfg) = if spec.capture_output {
            (Stdio::piped(), Stdio::piped())
        } else {
            (Stdio::null(), Stdio::null())
        };

        cmd.args(&spec.args)
            .current_dir(&spec.cwd)
            .stdin(Stdio::null())
            .stdout(stdout_cfg)
            .stderr(stderr_cfg)
            .kill_on_drop(true);

        debug!(
            program = %spec.program,
            cwd = %spec.cwd.display(),
            "Spawning process"
        );

        let start = Instant::now();
        let mut child = cmd.spawn().map_err(|e| {
            error!(program = %spec.program, error = %e, "Failed to start process");
            AppError::with_source(
                meshpipe_core::error::ErrorKind::ExternalCommand,
                format!("Failed to start '{}': {e}", spec.program),
                e,
            )
        })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // Pipes must be drained concurrently with wait().
        let (status, stdout, stderr) =
            tokio::join!(child.wait(), read_all(stdout), read_all(stderr));
        let status = status?;

        Ok(CommandOutput {
            exit_code: status.code(),
            success: status.success(),
            stdout,
            stderr: stderr.chars().take(MAX_STDERR_CHARS).collect(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn is_available(&self, program: &str) -> bool {
        let probe = if cfg!(target_os = "windows") {
            "where"
        } else {
            "which"
        };

        let result = Command::new(probe)
            .arg(program)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match result {
            Ok(status) => status.success(),
            Err(_) => false,
        }
    }
}
