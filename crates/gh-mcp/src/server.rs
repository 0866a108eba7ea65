//! MCP Server implementation
//!
//! Reads JSON-RPC messages line by line, routes `tools/*` requests to the
//! `gh-tools` dispatcher and writes one response line per request.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use gh_tools::{CommandRunner, DispatchError, Dispatcher, ProcessRunner, Registry};
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::protocol::{
    INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, InitializeParams, InitializeResult,
    JsonRpcRequest, JsonRpcResponse, METHOD_NOT_FOUND, PARSE_ERROR, PROTOCOL_VERSION,
    ServerCapabilities, ServerInfo, ToolCallParams, ToolsCapability,
};
use crate::tools::{ToolDefinition, ToolResult, get_tool_definitions};
use crate::{Error, Result};

/// MCP Server for the GitHub CLI
///
/// # Example
///
/// ```no_run
/// use gh_mcp::{GhMcpServer, ServerConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let server = GhMcpServer::new(&ServerConfig::default());
///     server.run().await?;
///     Ok(())
/// }
/// ```
pub struct GhMcpServer<R = ProcessRunner> {
    dispatcher: Dispatcher<R>,

    /// Definitions advertised by `tools/list`
    tools: Vec<ToolDefinition>,
}

impl GhMcpServer<ProcessRunner> {
    /// Create a server running the built-in tools through `gh`
    pub fn new(config: &ServerConfig) -> Self {
        let registry = Arc::new(Registry::with_builtins());
        Self::with_dispatcher(Dispatcher::new(registry, config.runner()))
    }

    /// Serve stdin/stdout until end of input or Ctrl-C
    pub async fn run(&self) -> Result<()> {
        self.check_gh().await;

        let shutdown = async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Received Ctrl-C"),
                Err(e) => {
                    warn!(error = %e, "Unable to listen for Ctrl-C");
                    std::future::pending::<()>().await;
                }
            }
        };

        self.serve(
            BufReader::new(tokio::io::stdin()),
            tokio::io::stdout(),
            shutdown,
        )
        .await
    }

    /// Check that `gh` can be launched. Failure is logged, never fatal.
    async fn check_gh(&self) {
        match self.dispatcher.runner().gh_version().await {
            Ok(version) => info!(version = %version, "GitHub CLI available"),
            Err(e) => warn!(
                error = %e,
                "GitHub CLI not available; tool calls will fail until it is installed"
            ),
        }
    }
}

impl<R: CommandRunner> GhMcpServer<R> {
    pub fn with_dispatcher(dispatcher: Dispatcher<R>) -> Self {
        let tools = get_tool_definitions(dispatcher.registry());
        Self { dispatcher, tools }
    }

    /// Process messages from `input` until it ends or `shutdown` resolves.
    ///
    /// `tools/call` requests run one at a time, in arrival order. Input keeps
    /// being read while a call runs, so other requests are answered right
    /// away. At end of input, queued calls are still completed.
    pub async fn serve<I, O, S>(&self, mut input: I, mut output: O, shutdown: S) -> Result<()>
    where
        I: AsyncBufRead + Unpin,
        O: AsyncWrite + Unpin,
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let mut buf = Vec::new();
        let mut input_open = true;
        let mut queued: VecDeque<String> = VecDeque::new();
        let mut in_flight: Option<InFlight<'_>> = None;

        info!(tools = self.tools.len(), "MCP server ready, listening on stdio");

        loop {
            if in_flight.is_none()
                && let Some(line) = queued.pop_front()
            {
                in_flight = Some(Box::pin(self.respond(line)));
            }
            if !input_open && in_flight.is_none() {
                info!("End of input, stopping");
                break;
            }

            tokio::select! {
                _ = &mut shutdown => {
                    // Dropping an in-flight call kills its subprocess
                    info!(
                        abandoned = in_flight.is_some(),
                        queued = queued.len(),
                        "Shutdown requested, stopping"
                    );
                    break;
                }
                handled = next_response(&mut in_flight) => {
                    in_flight = None;
                    write_response(&mut output, handled).await?;
                }
                read = input.read_until(b'\n', &mut buf), if input_open => {
                    if read? == 0 {
                        input_open = false;
                        if buf.is_empty() {
                            continue;
                        }
                    }

                    let raw = std::mem::take(&mut buf);
                    let line = match std::str::from_utf8(&raw) {
                        Ok(line) => line.trim(),
                        Err(e) => {
                            warn!(error = %e, "Message is not valid UTF-8");
                            write_response(&mut output, parse_error()).await?;
                            continue;
                        }
                    };
                    if line.is_empty() {
                        continue;
                    }

                    debug!(request = %line, "Received message");

                    if is_tool_call(line) {
                        queued.push_back(line.to_string());
                    } else {
                        let handled = self.handle_message(line).await;
                        write_response(&mut output, handled).await?;
                    }
                }
            }
        }

        Ok(())
    }

    async fn respond(&self, message: String) -> Result<String> {
        self.handle_message(&message).await
    }

    /// Handle a single MCP message
    ///
    /// Returns the serialized response, or an empty string for notifications.
    pub async fn handle_message(&self, message: &str) -> Result<String> {
        let value: Value = match serde_json::from_str(message) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Unparseable message");
                return parse_error();
            }
        };

        let id = value.get("id").filter(|id| !id.is_null()).cloned();
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                let response =
                    JsonRpcResponse::error(id, INVALID_REQUEST, format!("Invalid Request: {}", e));
                return serde_json::to_string(&response).map_err(Error::from);
            }
        };

        if request.is_notification() {
            debug!(method = %request.method, "Notification");
            return Ok(String::new());
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id, request.params)?,
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            "tools/list" => self.handle_tools_list(request.id)?,
            "tools/call" => self.handle_tools_call(request.id, request.params).await?,
            _ => JsonRpcResponse::error(
                request.id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        };

        serde_json::to_string(&response).map_err(Error::from)
    }

    fn handle_initialize(&self, id: Option<Value>, params: Value) -> Result<JsonRpcResponse> {
        let params: InitializeParams = serde_json::from_value(params).unwrap_or_default();
        match &params.client_info {
            Some(client) => info!(
                client = %client.name,
                client_version = %client.version,
                protocol = ?params.protocol_version,
                "Client connected"
            ),
            None => info!(protocol = ?params.protocol_version, "Client connected"),
        }

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
            },
            server_info: ServerInfo {
                name: "gh-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        Ok(JsonRpcResponse::success(id, serde_json::to_value(result)?))
    }

    fn handle_tools_list(&self, id: Option<Value>) -> Result<JsonRpcResponse> {
        let tools = serde_json::to_value(&self.tools)?;
        Ok(JsonRpcResponse::success(id, json!({ "tools": tools })))
    }

    async fn handle_tools_call(&self, id: Option<Value>, params: Value) -> Result<JsonRpcResponse> {
        let params: ToolCallParams = match serde_json::from_value(params) {
            Ok(params) => params,
            Err(e) => {
                let err = Error::InvalidParams(e.to_string());
                return Ok(JsonRpcResponse::error(id, INVALID_PARAMS, err.to_string()));
            }
        };

        match self.dispatcher.dispatch(&params.name, &params.arguments).await {
            Ok(result) => Ok(JsonRpcResponse::success(
                id,
                serde_json::to_value(ToolResult::from(result))?,
            )),
            Err(e) => Ok(dispatch_error_response(id, &e)),
        }
    }

    /// Get available tools
    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }
}

/// A tool call being awaited by [`GhMcpServer::serve`]
type InFlight<'a> = Pin<Box<dyn Future<Output = Result<String>> + 'a>>;

/// Resolves with the in-flight call's response; never resolves when idle.
async fn next_response(in_flight: &mut Option<InFlight<'_>>) -> Result<String> {
    match in_flight {
        Some(call) => call.await,
        None => std::future::pending().await,
    }
}

/// Whether a line is a `tools/call` request, which may run a subprocess
fn is_tool_call(line: &str) -> bool {
    serde_json::from_str::<Value>(line)
        .is_ok_and(|value| value.get("method").and_then(Value::as_str) == Some("tools/call"))
}

fn parse_error() -> Result<String> {
    let response = JsonRpcResponse::error(None, PARSE_ERROR, "Parse error".to_string());
    serde_json::to_string(&response).map_err(Error::from)
}

/// Write one response line. Empty responses (notifications) are skipped.
async fn write_response<O>(output: &mut O, handled: Result<String>) -> Result<()>
where
    O: AsyncWrite + Unpin,
{
    let response = match handled {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "Failed to handle message");
            let response =
                JsonRpcResponse::error(None, INTERNAL_ERROR, format!("Internal error: {}", e));
            serde_json::to_string(&response)?
        }
    };

    if !response.is_empty() {
        output.write_all(response.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
    }
    Ok(())
}

/// Map a failed tool call onto a JSON-RPC error.
fn dispatch_error_response(id: Option<Value>, err: &DispatchError) -> JsonRpcResponse {
    let (message, data) = match err {
        DispatchError::UnknownTool(name) => (format!("Unknown tool: {}", name), None),
        DispatchError::Validation(e) => (
            format!("Invalid params: {}", e),
            Some(json!({ "field": e.field, "reason": e.reason.code() })),
        ),
        DispatchError::Exec(e) => (format!("Tool execution failed: {}", e), None),
        DispatchError::ExecutionFailure {
            exit_code,
            stdout,
            stderr,
            ..
        } => (
            err.to_string(),
            Some(json!({ "exitCode": exit_code, "stdout": stdout, "stderr": stderr })),
        ),
    };
    JsonRpcResponse::error_with_data(id, err.class().code(), message, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gh_tools::{ExecError, ExecutionOutcome, ExternalCommand};

    /// Echoes the argv back as stdout
    struct Echo;

    #[async_trait]
    impl CommandRunner for Echo {
        async fn run(
            &self,
            command: &ExternalCommand,
        ) -> std::result::Result<ExecutionOutcome, ExecError> {
            Ok(ExecutionOutcome::success(command.args().join(" ")))
        }
    }

    fn server() -> GhMcpServer<Echo> {
        GhMcpServer::with_dispatcher(Dispatcher::new(Arc::new(Registry::with_builtins()), Echo))
    }

    async fn call(server: &GhMcpServer<Echo>, message: &str) -> Value {
        let response = server.handle_message(message).await.unwrap();
        serde_json::from_str(&response).unwrap()
    }

    #[test]
    fn server_lists_all_builtin_tools() {
        let server = server();
        assert_eq!(server.tools().len(), 9);
        assert_eq!(server.tools()[0].name, "gh_repo_list");
    }

    #[tokio::test]
    async fn test_handle_initialize() {
        let response = call(
            &server(),
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"test","version":"1.0"}}}"#,
        )
        .await;

        assert_eq!(response["result"]["protocolVersion"], "2024-11-05");
        assert_eq!(response["result"]["serverInfo"]["name"], "gh-mcp");
        assert_eq!(response["result"]["capabilities"]["tools"]["listChanged"], false);
    }

    #[tokio::test]
    async fn test_initialize_without_params() {
        let response = call(&server(), r#"{"jsonrpc":"2.0","id":1,"method":"initialize"}"#).await;
        assert_eq!(response["result"]["serverInfo"]["name"], "gh-mcp");
    }

    #[tokio::test]
    async fn test_notifications_get_no_response() {
        let server = server();
        for method in ["initialized", "notifications/initialized", "notifications/cancelled"] {
            let request = format!(r#"{{"jsonrpc":"2.0","method":"{}"}}"#, method);
            assert!(server.handle_message(&request).await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_ping() {
        let response = call(&server(), r#"{"jsonrpc":"2.0","id":"p","method":"ping"}"#).await;
        assert_eq!(response["id"], "p");
        assert_eq!(response["result"], json!({}));
    }

    #[tokio::test]
    async fn test_tools_call_success_body() {
        let response = call(
            &server(),
            r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"gh_repo_info","arguments":{"owner":"octo","repo":"demo"}}}"#,
        )
        .await;

        let text = response["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.starts_with("Repository Info:\nrepo view --json "));
        assert!(text.ends_with(" -- octo/demo"));
        assert!(response["result"].get("isError").is_none());
    }

    #[tokio::test]
    async fn test_tools_call_without_name() {
        let response = call(
            &server(),
            r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"arguments":{}}}"#,
        )
        .await;
        assert_eq!(response["error"]["code"], -32602);
        assert!(
            response["error"]["message"]
                .as_str()
                .unwrap()
                .starts_with("Invalid params:")
        );
    }

    #[tokio::test]
    async fn test_parse_error() {
        let response = call(&server(), "{not json").await;
        assert_eq!(response["error"]["code"], -32700);
        assert_eq!(response["error"]["message"], "Parse error");
        assert_eq!(response["id"], Value::Null);
    }

    #[tokio::test]
    async fn test_request_without_method() {
        let response = call(&server(), r#"{"jsonrpc":"2.0","id":9}"#).await;
        assert_eq!(response["error"]["code"], -32600);
        assert_eq!(response["id"], 9);
    }

    #[test]
    fn only_tool_calls_are_queued() {
        assert!(is_tool_call(r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{}}"#));
        assert!(!is_tool_call(r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#));
        assert!(!is_tool_call("not json"));
    }

    #[test]
    fn execution_failure_carries_streams() {
        let err = DispatchError::ExecutionFailure {
            command: "gh issue list".to_string(),
            exit_code: Some(1),
            stdout: String::new(),
            stderr: "HTTP 404: Not Found\n".to_string(),
        };
        let response = serde_json::to_value(dispatch_error_response(Some(json!(7)), &err)).unwrap();

        assert_eq!(response["error"]["code"], -32603);
        assert_eq!(response["error"]["message"], "GitHub CLI error: HTTP 404: Not Found");
        assert_eq!(response["error"]["data"]["exitCode"], 1);
        assert_eq!(response["error"]["data"]["stderr"], "HTTP 404: Not Found\n");
    }
}
