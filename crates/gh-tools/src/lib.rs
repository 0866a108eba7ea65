//! GitHub CLI tool dispatch
//!
//! This crate turns structured tool calls into invocations of the `gh`
//! command-line program and hands the program's text output back to the
//! caller.
//!
//! # Architecture
//!
//! ```text
//! tool name + JSON arguments
//!        |
//!        v
//! [ Registry ]   lookup descriptor (schema, builder, label, stderr policy)
//!        |
//!        v
//! [ validate ]   required -> types -> enums -> defaults
//!        |
//!        v
//! [ builders ]   pure: ValidatedArguments -> ExternalCommand (argv tokens)
//!        |
//!        v
//! [ CommandRunner ]  spawn, capture stdout/stderr, classify
//!        |
//!        v
//! [ format ]     "<label>\n<stdout>" plus an optional Warnings/Info block
//! ```
//!
//! The [`Dispatcher`] sequences these steps and converts any failure into a
//! [`DispatchError`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use gh_tools::{Dispatcher, ProcessRunner, Registry};
//!
//! # async fn demo() -> gh_tools::Result<()> {
//! let dispatcher = Dispatcher::new(Arc::new(Registry::with_builtins()), ProcessRunner::new());
//! let result = dispatcher
//!     .dispatch("gh_issue_list", &serde_json::json!({"owner": "octo", "repo": "demo"}))
//!     .await?;
//! println!("{}", result.text());
//! # Ok(())
//! # }
//! ```

pub mod builders;
pub mod command;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod format;
pub mod registry;
pub mod schema;
pub mod validate;

pub use command::{CommandBuilder, ExternalCommand};
pub use dispatch::Dispatcher;
pub use error::{
    DispatchError, ErrorClass, ExecError, Result, Stage, ValidationError, ValidationReason,
};
pub use executor::{CommandRunner, ExecutionOutcome, OutcomeKind, ProcessRunner};
pub use format::{Advisory, ToolCallResult};
pub use registry::Registry;
pub use schema::{ParamDefault, ParamSpec, ParamType, StderrPolicy, ToolDescriptor};
pub use validate::{ArgValue, ValidatedArguments, validate};
