//! MCP Server for the GitHub CLI
//!
//! This crate exposes `gh` operations via the Model Context Protocol (MCP),
//! so that agents can list and create repositories, issues, pull requests
//! and workflow runs through a fixed set of validated tools.
//!
//! # Architecture
//!
//! ```text
//! [ MCP Client (agent / IDE) ]
//!        | (JSON-RPC over stdio)
//!        v
//! [ gh-mcp (MCP Server) ]
//!        | (Rust API)
//!        v
//! [ gh-tools (registry, validation, command building) ]
//!        |
//!        +--> [ gh subprocess ]
//! ```
//!
//! # Tools
//!
//! - Repositories: `gh_repo_list`, `gh_repo_info`, `gh_repo_create`
//! - Issues: `gh_issue_list`, `gh_issue_create`
//! - Pull requests: `gh_pr_list`, `gh_pr_create`
//! - Workflows: `gh_workflow_list`, `gh_workflow_run`

pub mod config;
pub mod error;
pub mod protocol;
pub mod server;
pub mod tools;

pub use config::{Args, ServerConfig};
pub use error::{Error, Result};
pub use server::GhMcpServer;
pub use tools::{ToolContent, ToolDefinition, ToolResult, get_tool_definitions};
