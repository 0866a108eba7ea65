//! Result formatting
//!
//! Output is passed through verbatim behind a per-tool label. Nothing is
//! parsed or reshaped.

use crate::executor::ExecutionOutcome;
use crate::schema::{StderrPolicy, ToolDescriptor};

/// Diagnostic text from a successful mutating call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub heading: &'static str,
    pub text: String,
}

/// Caller-facing result of a successful tool call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallResult {
    pub tool: &'static str,
    pub label: &'static str,
    pub output: String,
    pub advisory: Option<Advisory>,
}

impl ToolCallResult {
    /// Full text body: label, output, then the advisory block if any.
    pub fn text(&self) -> String {
        let mut text = format!("{}\n{}", self.label, self.output);
        if let Some(advisory) = &self.advisory {
            text.push('\n');
            text.push_str(advisory.heading);
            text.push('\n');
            text.push_str(&advisory.text);
        }
        text
    }
}

/// Wrap an outcome in the tool's label.
///
/// Error-stream text becomes an advisory block only for tools whose policy
/// allows it; the dispatcher rejects it for strict tools before this point.
pub fn format(descriptor: &ToolDescriptor, outcome: ExecutionOutcome) -> ToolCallResult {
    let advisory = match descriptor.stderr_policy {
        StderrPolicy::Advisory { heading } if !outcome.stderr.trim().is_empty() => {
            Some(Advisory {
                heading,
                text: outcome.stderr,
            })
        }
        _ => None,
    };

    ToolCallResult {
        tool: descriptor.name,
        label: descriptor.label,
        output: outcome.stdout,
        advisory,
    }
}
