//! Command execution
//!
//! [`CommandRunner`] is the seam between dispatch and the operating system.
//! [`ProcessRunner`] spawns real subprocesses; tests substitute an in-memory
//! runner.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::builders::GH_PROGRAM;
use crate::command::ExternalCommand;
use crate::error::{DispatchError, ExecError};

/// Default per-call limit for a subprocess
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// How a finished command ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    /// Zero exit, empty error stream
    Success,
    /// Zero exit, non-empty error stream
    Warning,
    /// Nonzero exit, or killed by a signal (`exit_code: None`)
    Failed { exit_code: Option<i32> },
}

/// Captured result of a finished command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub stdout: String,
    pub stderr: String,
    pub kind: OutcomeKind,
}

impl ExecutionOutcome {
    /// Classify captured output. Whitespace-only stderr counts as empty.
    pub fn classify(exit_code: Option<i32>, stdout: String, stderr: String) -> Self {
        let kind = match exit_code {
            Some(0) if stderr.trim().is_empty() => OutcomeKind::Success,
            Some(0) => OutcomeKind::Warning,
            other => OutcomeKind::Failed { exit_code: other },
        };
        Self {
            stdout,
            stderr,
            kind,
        }
    }

    pub fn success(stdout: impl Into<String>) -> Self {
        Self::classify(Some(0), stdout.into(), String::new())
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.kind, OutcomeKind::Failed { .. })
    }
}

/// Runs an [`ExternalCommand`] to completion.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &ExternalCommand) -> Result<ExecutionOutcome, ExecError>;
}

/// Runs commands as subprocesses with captured output.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    /// Binary used in place of `gh`
    gh_path: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self {
            gh_path: None,
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `path` whenever a command names the `gh` program.
    pub fn with_gh_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.gh_path = Some(path.into());
        self
    }

    /// Limit each command's run time; `None` waits indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn resolve(&self, command: &ExternalCommand) -> PathBuf {
        match &self.gh_path {
            Some(path) if command.program() == GH_PROGRAM => path.clone(),
            _ => PathBuf::from(command.program()),
        }
    }

    /// First line of `gh --version`, used as a startup health check.
    ///
    /// A nonzero exit is reported as [`DispatchError::ExecutionFailure`].
    pub async fn gh_version(&self) -> crate::error::Result<String> {
        let version_cmd = ExternalCommand::new(GH_PROGRAM, ["--version"]);
        let outcome = self.run(&version_cmd).await?;
        if let OutcomeKind::Failed { exit_code } = outcome.kind {
            return Err(DispatchError::ExecutionFailure {
                command: version_cmd.to_string(),
                exit_code,
                stdout: outcome.stdout,
                stderr: outcome.stderr,
            });
        }
        Ok(outcome.stdout.lines().next().unwrap_or_default().to_string())
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &ExternalCommand) -> Result<ExecutionOutcome, ExecError> {
        let program = self.resolve(command);
        let shown = program.display().to_string();

        let child = Command::new(&program)
            .args(command.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ExecError::Launch {
                program: shown.clone(),
                source,
            })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| ExecError::Timeout {
                    program: shown.clone(),
                    after: limit,
                })??,
            None => child.wait_with_output().await?,
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let outcome = ExecutionOutcome::classify(output.status.code(), stdout, stderr);

        tracing::trace!(program = %shown, kind = ?outcome.kind, "Command finished");
        Ok(outcome)
    }
}
