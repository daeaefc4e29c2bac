//! Generic "run a command" host primitive.

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// A fully-specified external command invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Program to execute (name on PATH or explicit path).
    pub program: String,
    /// Arguments, already split into argv tokens.
    pub args: Vec<String>,
    /// Working directory for the child process.
    pub cwd: PathBuf,
    /// Whether stdout/stderr should be captured.
    pub capture_output: bool,
}

impl CommandSpec {
    /// Create a command with output capture enabled.
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
            capture_output: true,
        }
    }

    /// Append arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set whether output is captured.
    pub fn capture_output(mut self, capture: bool) -> Self {
        self.capture_output = capture;
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Outcome of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutput {
    /// Exit code, `None` when terminated by a signal.
    pub exit_code: Option<i32>,
    /// Whether the process exited successfully.
    pub success: bool,
    /// Captured standard output (empty when not captured).
    pub stdout: String,
    /// Captured standard error (empty when not captured).
    pub stderr: String,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl CommandOutput {
    /// A successful, silent outcome.
    pub fn succeeded() -> Self {
        Self {
            exit_code: Some(0),
            success: true,
            ..Default::default()
        }
    }

    /// A failed outcome with the given code and stderr.
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(code),
            success: false,
            stderr: stderr.into(),
            ..Default::default()
        }
    }
}

/// Runs external commands on behalf of plugins.
///
/// `run` resolves once the process has exited. A non-zero exit is reported
/// through [`CommandOutput::success`], not as an `Err`; errors are reserved
/// for failures to start or wait on the process.
#[async_trait]
pub trait CommandRunner: Send + Sync + std::fmt::Debug {
    /// Execute the command and wait for it to finish.
    async fn run(&self, spec: &CommandSpec) -> AppResult<CommandOutput>;

    /// Check whether a program can be found.
    async fn is_available(&self, _program: &str) -> bool {
        true
    }
}
