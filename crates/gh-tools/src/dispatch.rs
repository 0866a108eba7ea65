//! Tool call dispatch
//!
//! Each call runs the same linear pipeline:
//!
//! ```text
//! Received -> Validated -> CommandBuilt -> Executed -> Formatted -> Returned
//!     \___________\_____________\_____________\-> Errored
//! ```
//!
//! Unknown tools stop at `Received` and never reach the builder or runner.
//! No state is shared between calls apart from the read-only registry.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{DispatchError, Result};
use crate::executor::{CommandRunner, ExecutionOutcome, OutcomeKind, ProcessRunner};
use crate::format::{ToolCallResult, format};
use crate::registry::Registry;
use crate::schema::{StderrPolicy, ToolDescriptor};
use crate::validate::validate;

/// Routes tool calls through validation, command building, execution and formatting.
pub struct Dispatcher<R = ProcessRunner> {
    registry: Arc<Registry>,
    runner: R,
}

impl<R: CommandRunner> Dispatcher<R> {
    pub fn new(registry: Arc<Registry>, runner: R) -> Self {
        Self { registry, runner }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run one tool call to completion.
    pub async fn dispatch(&self, name: &str, arguments: &Value) -> Result<ToolCallResult> {
        let descriptor = self
            .registry
            .lookup(name)
            .ok_or_else(|| DispatchError::UnknownTool(name.to_string()))?;

        let args = validate(descriptor, arguments).inspect_err(|e| {
            warn!(tool = name, field = %e.field, reason = e.reason.code(), "Rejected arguments");
        })?;

        let command = descriptor.build_command(&args);
        debug!(tool = name, command = %command, "Running command");

        let started = Instant::now();
        let outcome = self.runner.run(&command).await.inspect_err(|e| {
            warn!(tool = name, error = %e, "Command could not run");
        })?;
        let elapsed_ms = millis(started.elapsed());

        if let Some(failure) = rejected(descriptor, &command.to_string(), &outcome) {
            warn!(tool = name, elapsed_ms, error = %failure, "Command failed");
            return Err(failure);
        }

        info!(tool = name, elapsed_ms, kind = ?outcome.kind, "Tool call completed");
        Ok(format(descriptor, outcome))
    }
}

/// Whole milliseconds, saturating at `u64::MAX`
fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Apply the tool's error policy to a finished command.
fn rejected(
    descriptor: &ToolDescriptor,
    command: &str,
    outcome: &ExecutionOutcome,
) -> Option<DispatchError> {
    let exit_code = match (outcome.kind, descriptor.stderr_policy) {
        (OutcomeKind::Failed { exit_code }, _) => exit_code,
        (OutcomeKind::Warning, StderrPolicy::Strict) => Some(0),
        _ => return None,
    };
    Some(DispatchError::ExecutionFailure {
        command: command.to_string(),
        exit_code,
        stdout: outcome.stdout.clone(),
        stderr: outcome.stderr.clone(),
    })
}
