//! MCP server implementation.
//!
//! Maps JSON-RPC methods onto the tool registry and the operation
//! dispatcher, and runs the configured transport.

use crate::dispatcher::Dispatcher;
use crate::error::McpError;
use crate::http_transport::HttpServer;
use crate::operation::Operation;
use crate::protocol::*;
use crate::tools::ToolRegistry;
use serde_json::{Value, json};
use sqlgate_core::{McpConfig, Transport};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// The MCP server.
///
/// Cheap to clone; clones share the registry and dispatcher.
#[derive(Clone)]
pub struct McpServer {
    config: McpConfig,
    tools: Arc<ToolRegistry>,
    dispatcher: Dispatcher,
}

impl McpServer {
    /// Create a new MCP server serving the gateway's tool catalog.
    pub fn new(config: McpConfig, dispatcher: Dispatcher) -> Result<Self, McpError> {
        Ok(Self::with_registry(
            config,
            ToolRegistry::with_catalog()?,
            dispatcher,
        ))
    }

    /// Create a server with an explicit registry.
    pub fn with_registry(config: McpConfig, tools: ToolRegistry, dispatcher: Dispatcher) -> Self {
        Self {
            config,
            tools: Arc::new(tools),
            dispatcher,
        }
    }

    pub fn config(&self) -> &McpConfig {
        &self.config
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Start the MCP server. Runs until the transport ends.
    pub async fn run(&self) -> Result<(), McpError> {
        match self.config.transport {
            Transport::Stdio => self.run_stdio().await,
            Transport::Sse => self.run_http().await,
        }
    }

    /// Run the server with stdio transport.
    ///
    /// Newline-delimited JSON-RPC. Requests are handled concurrently; responses
    /// are written one per line in completion order.
    async fn run_stdio(&self) -> Result<(), McpError> {
        tracing::info!("Starting MCP server with stdio transport");

        let (response_tx, mut response_rx) = mpsc::channel::<JsonRpcResponse>(64);
        let writer = tokio::spawn(async move {
            let mut stdout = tokio::io::stdout();
            while let Some(response) = response_rx.recv().await {
                let mut line = match serde_json::to_vec(&response) {
                    Ok(line) => line,
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to serialize response");
                        continue;
                    }
                };
                line.push(b'\n');
                stdout.write_all(&line).await?;
                stdout.flush().await?;
            }
            Ok::<_, std::io::Error>(())
        });

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut in_flight = JoinSet::new();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let request = match JsonRpcRequest::parse(&line) {
                Ok(request) => request,
                Err(response) => {
                    let _ = response_tx.send(response).await;
                    continue;
                }
            };

            let server = self.clone();
            let response_tx = response_tx.clone();
            in_flight.spawn(async move {
                if let Some(response) = server.handle_request(request).await {
                    let _ = response_tx.send(response).await;
                }
            });

            while in_flight.try_join_next().is_some() {}
        }

        tracing::info!("stdin closed, finishing in-flight requests");
        while in_flight.join_next().await.is_some() {}
        drop(response_tx);

        writer
            .await
            .map_err(|e| McpError::TransportError(e.to_string()))??;
        Ok(())
    }

    /// Run the server with the HTTP/SSE transport.
    pub async fn run_http(&self) -> Result<(), McpError> {
        let address = self.config.bind_address();
        tracing::info!(address = %address, "Starting MCP server with SSE transport");

        HttpServer::new(address, self.clone()).run().await
    }

    /// Handle a JSON-RPC request.
    ///
    /// Returns `None` for notifications, which get no response.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let id = request.id.clone();
        let is_notification = request.is_notification();

        let response = match request.method.as_str() {
            _ if request.jsonrpc != "2.0" => JsonRpcResponse::error(
                id,
                INVALID_REQUEST,
                format!("Unsupported jsonrpc version: {}", request.jsonrpc),
            ),
            "initialize" => self.handle_initialize(id),
            "initialized" | "notifications/initialized" => {
                tracing::debug!("Client initialized");
                JsonRpcResponse::success(id, json!({}))
            }
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_list_tools(id),
            "tools/call" => self.handle_call_tool(id, request.params).await,
            "shutdown" => self.handle_shutdown(id),
            method if is_notification && method.starts_with("notifications/") => {
                tracing::debug!(method, "Ignoring notification");
                return None;
            }
            _ => JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        };

        if is_notification {
            None
        } else {
            Some(response)
        }
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "serverInfo": ServerInfo {
                name: "sqlgate".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            "capabilities": {
                "tools": {
                    "listChanged": false
                }
            }
        });
        JsonRpcResponse::success(id, result)
    }

    fn handle_list_tools(&self, id: Option<Value>) -> JsonRpcResponse {
        let response = ListToolsResponse {
            tools: self.tools.list().into_iter().cloned().collect(),
        };
        match serde_json::to_value(response) {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, e.to_string()),
        }
    }

    async fn handle_call_tool(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: CallToolParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Invalid params: {}", e));
                }
            },
            None => return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing params"),
        };

        if !self.tools.contains(&params.name) {
            return JsonRpcResponse::error(
                id,
                INVALID_PARAMS,
                format!("Tool not found: {}", params.name),
            );
        }

        let arguments = match params.arguments {
            Some(Value::Null) | None => json!({}),
            Some(arguments) => arguments,
        };

        let response = match self
            .tools
            .validate(&params.name, &arguments)
            .and_then(|()| Operation::from_tool_call(&params.name, &arguments))
        {
            Ok(op) => {
                tracing::info!(tool = %params.name, "Calling tool");
                CallToolResponse::from(self.dispatcher.dispatch(op).await)
            }
            Err(e) => {
                tracing::debug!(tool = %params.name, error = %e, "Rejected tool arguments");
                CallToolResponse::error(format!("Error: {}", e))
            }
        };

        match serde_json::to_value(response) {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, e.to_string()),
        }
    }

    fn handle_shutdown(&self, id: Option<Value>) -> JsonRpcResponse {
        tracing::info!("MCP client requested shutdown");
        JsonRpcResponse::success(id, json!(null))
    }
}
