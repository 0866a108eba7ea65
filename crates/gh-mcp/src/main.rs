//! GitHub CLI MCP Server
//!
//! A Model Context Protocol server that exposes GitHub CLI operations
//! to agentic IDEs.
//!
//! # Usage
//!
//! ```bash
//! gh-mcp [--gh <path>] [--timeout-secs <n>] [--log-filter <filter>]
//! ```
//!
//! # Environment Variables
//!
//! - `GH_MCP_GH_PATH`, `GH_MCP_TIMEOUT_SECS`, `GH_MCP_LOG`: flag fallbacks
//! - `RUST_LOG`: extra log directives on top of the default filter
//!
//! # Protocol
//!
//! The server communicates via JSON-RPC 2.0 over stdio:
//! - Requests/responses go through stdout
//! - Logs go to stderr (to avoid interfering with the protocol)

use clap::Parser;
use gh_mcp::{Args, GhMcpServer, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from(Args::parse());

    // Initialize logging to stderr (stdout is reserved for MCP protocol)
    let mut filter = EnvFilter::try_new(&config.log_filter)?;
    if let Ok(extra) = std::env::var("RUST_LOG") {
        for directive in extra.split(',').filter(|d| !d.trim().is_empty()) {
            filter = filter.add_directive(directive.trim().parse()?);
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(
        gh = %config.gh_path.display(),
        timeout = ?config.timeout,
        "Starting gh-mcp server"
    );

    let server = GhMcpServer::new(&config);
    server.run().await?;

    Ok(())
}
