//! Command execution helper
//!
//! Runs a single external command in a given directory and captures its
//! status and output. The builder never spawns processes itself; it goes
//! through a [`CommandRunner`] so tests can swap in a recording double.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::error::{BuildError, Result};

/// One command to dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecRequest {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory for the child process
    pub cwd: PathBuf,
    /// Human-readable label used in log lines (e.g. "force build")
    pub description: String,
}

impl ExecRequest {
    /// Command as it would be typed in a shell, e.g. `make build`
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Result of a command execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    pub success: bool,
    /// -1 when the child was killed by a signal
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
}

impl ExecResult {
    /// stdout followed by stderr, skipping whichever is empty
    pub fn output(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (true, true) => String::new(),
            (false, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => format!("{}\n{}", self.stdout.trim_end_matches('\n'), self.stderr),
        }
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, request: &ExecRequest) -> Result<ExecResult>;
}

/// Spawns real child processes via `tokio::process`
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, request: &ExecRequest) -> Result<ExecResult> {
        let start = Instant::now();

        let output = Command::new(&request.program)
            .args(&request.args)
            .current_dir(&request.cwd)
            .output()
            .await
            .map_err(|e| spawn_error(e, request))?;

        Ok(ExecResult {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// Spawn fails the same way for a bad cwd and a missing program, so look at
/// the directory before blaming the tool.
fn spawn_error(err: std::io::Error, request: &ExecRequest) -> BuildError {
    if let Err(dir_err) = std::fs::read_dir(&request.cwd) {
        return BuildError::for_project_dir(dir_err, &request.cwd);
    }
    match err.kind() {
        ErrorKind::NotFound => BuildError::ToolNotFound(request.program.clone()),
        _ => BuildError::IoError(err),
    }
}

/// Run `request` through `runner`, logging under the builder's `name`.
pub async fn exec_cmd(
    runner: &dyn CommandRunner,
    name: &str,
    request: &ExecRequest,
) -> Result<ExecResult> {
    debug!(
        "[{}] {}: running `{}` in {}",
        name,
        request.description,
        request.command_line(),
        request.cwd.display()
    );

    let result = runner.run(request).await.inspect_err(|e| {
        error!("[{}] {} could not start: {}", name, request.description, e);
    })?;

    if result.success {
        info!("[{}] {} succeeded in {}ms", name, request.description, result.duration_ms);
    } else {
        error!(
            "[{}] {} failed with exit code {} after {}ms",
            name, request.description, result.exit_code, result.duration_ms
        );
    }

    Ok(result)
}
