//! Server configuration
//!
//! Flags are parsed with clap; every flag falls back to an environment
//! variable so MCP clients can configure the server without editing argv.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use gh_tools::ProcessRunner;

pub const DEFAULT_LOG_FILTER: &str = "gh_mcp=info,gh_tools=info";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// MCP server for the GitHub CLI
#[derive(Debug, Parser)]
#[command(name = "gh-mcp")]
#[command(about = "MCP server exposing GitHub CLI operations")]
#[command(version)]
pub struct Args {
    /// Path to the gh binary
    #[arg(long = "gh", env = "GH_MCP_GH_PATH", default_value = "gh")]
    pub gh: PathBuf,

    /// Per-call subprocess timeout in seconds (0 disables)
    #[arg(long, env = "GH_MCP_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Default tracing directives, combined with RUST_LOG
    #[arg(long, env = "GH_MCP_LOG", default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,
}

/// Resolved server settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub gh_path: PathBuf,
    pub timeout: Option<Duration>,
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            gh_path: PathBuf::from("gh"),
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            gh_path: args.gh,
            timeout: (args.timeout_secs > 0).then(|| Duration::from_secs(args.timeout_secs)),
            log_filter: args.log_filter,
        }
    }
}

impl ServerConfig {
    /// Process runner honoring the configured binary and timeout
    pub fn runner(&self) -> ProcessRunner {
        ProcessRunner::new()
            .with_gh_path(self.gh_path.clone())
            .with_timeout(self.timeout)
    }
}
