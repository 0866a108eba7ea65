//! Error types for tool dispatch

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Result type alias for dispatch operations
pub type Result<T> = std::result::Result<T, DispatchError>;

/// Pseudo-field reported when the argument bag itself has the wrong shape
pub const ARGUMENTS_FIELD: &str = "arguments";

/// Why a single argument was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationReason {
    /// A required field is absent or `null`
    MissingRequired,
    /// A present field does not have its declared type
    WrongType { expected: &'static str },
    /// A restricted field holds a value outside its declared choices
    InvalidEnumValue { allowed: &'static [&'static str] },
}

impl ValidationReason {
    /// Stable machine-readable reason code
    pub fn code(&self) -> &'static str {
        match self {
            ValidationReason::MissingRequired => "missing-required",
            ValidationReason::WrongType { .. } => "wrong-type",
            ValidationReason::InvalidEnumValue { .. } => "invalid-enum-value",
        }
    }
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationReason::MissingRequired => f.write_str("missing required field"),
            ValidationReason::WrongType { expected } => write!(f, "expected {}", expected),
            ValidationReason::InvalidEnumValue { allowed } => {
                write!(f, "expected one of [{}]", allowed.join(", "))
            }
        }
    }
}

/// An argument bag that does not satisfy its tool's schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value for '{field}': {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: ValidationReason,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: ValidationReason) -> Self {
        Self {
            field: field.into(),
            reason,
        }
    }
}

/// Errors raised while running an external command
#[derive(Debug, Error)]
pub enum ExecError {
    /// The program could not be started (missing binary, permission denied)
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The program did not finish within the configured limit
    #[error("{program} timed out after {}s", .after.as_secs())]
    Timeout { program: String, after: Duration },

    /// Reading the program's output failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Caller-facing class of a dispatch failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The requested tool does not exist
    MethodNotFound,
    /// The arguments do not match the tool's schema
    InvalidParams,
    /// The external program could not run or reported failure
    Internal,
}

impl ErrorClass {
    /// JSON-RPC 2.0 error code for this class
    pub fn code(self) -> i32 {
        match self {
            ErrorClass::MethodNotFound => -32601,
            ErrorClass::InvalidParams => -32602,
            ErrorClass::Internal => -32603,
        }
    }
}

/// Where in the per-call pipeline a failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Validated,
    CommandBuilt,
    Executed,
}

/// Errors that end a tool call
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Tool name is not in the registry
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Arguments rejected before any command was built
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The command could not be run to completion
    #[error(transparent)]
    Exec(#[from] ExecError),

    /// The command ran but reported failure
    #[error("GitHub CLI error: {}", failure_detail(.exit_code, .stdout, .stderr))]
    ExecutionFailure {
        command: String,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },
}

impl DispatchError {
    pub fn class(&self) -> ErrorClass {
        match self {
            DispatchError::UnknownTool(_) => ErrorClass::MethodNotFound,
            DispatchError::Validation(_) => ErrorClass::InvalidParams,
            DispatchError::Exec(_) | DispatchError::ExecutionFailure { .. } => {
                ErrorClass::Internal
            }
        }
    }

    /// The last stage the call reached before failing
    pub fn stage(&self) -> Stage {
        match self {
            DispatchError::UnknownTool(_) => Stage::Received,
            DispatchError::Validation(_) => Stage::Received,
            DispatchError::Exec(_) => Stage::CommandBuilt,
            DispatchError::ExecutionFailure { .. } => Stage::Executed,
        }
    }
}

/// Prefer the error stream; fall back to stdout, then to the exit status.
fn failure_detail(exit_code: &Option<i32>, stdout: &str, stderr: &str) -> String {
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }
    let stdout = stdout.trim();
    if !stdout.is_empty() {
        return stdout.to_string();
    }
    match exit_code {
        Some(code) => format!("exited with status {}", code),
        None => "terminated by signal".to_string(),
    }
}
