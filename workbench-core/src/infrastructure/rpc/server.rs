use crate::constants::{PROTOCOL_VERSION, SERVER_NAME};
use crate::rpc::types::{INTERNAL_ERROR, RpcRequest, RpcResponse};
use crate::tooling::{ToolDescriptor, ToolRegistry};
use serde_json::{Value, json};
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

const SERVER_INSTRUCTIONS: &str = "Arithmetic on integers, file management relative to the workspace root, and shell commands when enabled. Paths may be relative to the workspace root or absolute.";

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("stdin/stdout I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Serves a tool registry as an MCP server over newline-delimited JSON-RPC.
///
/// Requests are handled strictly one after another.
#[derive(Clone)]
pub struct ToolServer {
    registry: Arc<ToolRegistry>,
}

impl ToolServer {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub async fn serve_stdio(&self) -> Result<(), ServeError> {
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Reads requests until the input closes.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<(), ServeError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!(tools = self.registry.len(), "Tool server listening on stdio");
        let mut lines = BufReader::new(reader).lines();
        while let Some(line) = lines.next_line().await? {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if let Some(response) = self.handle_line(trimmed).await {
                let mut encoded = serde_json::to_string(&response)?;
                encoded.push('\n');
                writer.write_all(encoded.as_bytes()).await?;
                writer.flush().await?;
            }
        }
        info!("Input closed, tool server stopping");
        Ok(())
    }

    /// Handles one raw message. Notifications and stray responses yield `None`.
    pub async fn handle_line(&self, line: &str) -> Option<RpcResponse> {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(err) => {
                warn!(%err, "Unparseable JSON-RPC message");
                return Some(RpcResponse::parse_error(format!("Parse error: {err}")));
            }
        };

        let id = value.get("id").cloned();
        let is_response =
            value.get("result").is_some() || value.get("error").is_some();
        if value.get("method").is_none() && is_response {
            debug!(?id, "Ignoring response sent to the tool server");
            return None;
        }

        let request: RpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(err) => {
                warn!(%err, "Malformed JSON-RPC request");
                return Some(RpcResponse::invalid_request(
                    id,
                    format!("Invalid request: {err}"),
                ));
            }
        };
        self.handle(request).await
    }

    pub async fn handle(&self, request: RpcRequest) -> Option<RpcResponse> {
        debug!(method = %request.method, "Received JSON-RPC request");

        if request.jsonrpc != "2.0" {
            return Some(RpcResponse::invalid_request(
                request.id,
                "Unsupported jsonrpc version (expected 2.0)",
            ));
        }
        if request.method.is_empty() {
            return Some(RpcResponse::invalid_request(request.id, "Missing method"));
        }

        if request.is_notification() {
            match request.method.as_str() {
                "notifications/initialized" => info!("Client finished initialization"),
                other => debug!(method = other, "Ignoring notification"),
            }
            return None;
        }

        let id = request.id.clone();
        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id, request.params.as_ref()),
            "ping" => RpcResponse::success(id, json!({})),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            other => {
                error!(method = other, "Unknown JSON-RPC method");
                RpcResponse::method_not_found(id, other)
            }
        };
        Some(response)
    }

    fn handle_initialize(&self, id: Option<Value>, params: Option<&Value>) -> RpcResponse {
        let client = params
            .and_then(|params| params.get("clientInfo"))
            .and_then(|info| info.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        info!(client, "Initializing MCP session");
        RpcResponse::success(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": { "listChanged": false } },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": env!("CARGO_PKG_VERSION"),
                },
                "instructions": SERVER_INSTRUCTIONS,
            }),
        )
    }

    fn handle_tools_list(&self, id: Option<Value>) -> RpcResponse {
        let tools: Vec<ToolDescriptor> = self.registry.list().map(ToolDescriptor::from).collect();
        RpcResponse::success(id, json!({ "tools": tools }))
    }

    async fn handle_tools_call(&self, id: Option<Value>, params: Option<Value>) -> RpcResponse {
        let Some(Value::Object(mut params)) = params else {
            return RpcResponse::invalid_params(id, "params must be an object with name");
        };
        let name = match params.remove("name") {
            Some(Value::String(name)) if !name.trim().is_empty() => name,
            _ => {
                return RpcResponse::invalid_params(id, "params.name must be a non-empty string");
            }
        };
        let arguments = params.remove("arguments").unwrap_or(Value::Null);

        let registry = Arc::clone(&self.registry);
        let tool = name.clone();
        match tokio::task::spawn_blocking(move || registry.invoke(&tool, arguments)).await {
            Ok(result) => RpcResponse::success(id, result.to_call_result()),
            Err(err) => {
                error!(tool = %name, %err, "Tool handler task failed");
                RpcResponse::error(id, INTERNAL_ERROR, format!("tool '{name}' crashed"))
            }
        }
    }
}
