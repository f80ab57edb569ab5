//! MCP server loop
//!
//! Line-delimited JSON-RPC over stdio. Every request gets exactly one
//! response line; notifications get none. A failing tool call is reported in
//! its payload and the loop keeps serving.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use super::catalog;
use super::protocol::*;
use crate::core::error::SearchError;
use crate::core::search::ErrorResult;

pub const SERVER_NAME: &str = "file-search-server";

#[derive(Default)]
pub struct McpServer;

impl McpServer {
    pub fn new() -> Self {
        Self
    }

    /// Serve stdin/stdout until stdin closes
    pub async fn run(&self) -> Result<()> {
        self.serve(BufReader::new(io::stdin()), io::stdout()).await
    }

    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .await
                .context("Failed to read request")?;
            if read == 0 {
                break;
            }

            let line = buf.trim_ascii();
            if line.is_empty() {
                continue;
            }

            let request = match parse_request(line) {
                Ok(req) => req,
                Err(response) => {
                    write_response(&mut writer, &response).await?;
                    continue;
                }
            };

            if request.is_notification() {
                self.handle_notification(&request);
                continue;
            }

            let response = self.handle_request(request).await;
            write_response(&mut writer, &response).await?;
        }

        log::info!("Input closed, shutting down");
        Ok(())
    }

    fn handle_notification(&self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            "notifications/initialized" | "initialized" => {
                log::debug!("Client finished initialization");
            }
            other => log::debug!("Ignoring notification: {}", other),
        }
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        log::debug!("-> {}", request.method);

        match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id, request.params),
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            "tools/list" => self.handle_tools_list(request.id),
            "tools/call" => self.handle_tools_call(request.id, request.params).await,
            _ => JsonRpcResponse::error(
                request.id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        }
    }

    fn handle_initialize(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: InitializeParams = params
            .and_then(|p| serde_json::from_value(p).ok())
            .unwrap_or_default();

        let protocol_version = negotiate_protocol_version(params.protocol_version.as_deref());
        log::info!("Initialized with protocol {}", protocol_version);

        let result = InitializeResult {
            protocol_version: protocol_version.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability {
                    list_changed: false,
                },
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        respond(id, &result)
    }

    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = ToolsListResult {
            tools: catalog::definitions().collect(),
        };
        respond(id, &result)
    }

    async fn handle_tools_call(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params = match params {
            Some(p) => p,
            None => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing params".to_string());
            }
        };

        let call: ToolCallParams = match serde_json::from_value(params) {
            Ok(c) => c,
            Err(e) => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Invalid params: {}", e));
            }
        };

        let args = match call.arguments {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };
        let name = call.name;

        let outcome = {
            let name = name.clone();
            tokio::task::spawn_blocking(move || catalog::invoke(&name, &args)).await
        };

        match outcome {
            Ok(outcome) => {
                let result = render_outcome(outcome);
                if result.is_error.unwrap_or(false) {
                    log::warn!("{} failed: {}", name, result.text());
                }
                respond(id, &result)
            }
            Err(e) => JsonRpcResponse::error(
                id,
                INTERNAL_ERROR,
                format!("Tool {} aborted: {}", name, e),
            ),
        }
    }
}

/// Split one input line into a request or the error response it earns.
/// Bytes that are not JSON get -32700. JSON that is not a single JSON-RPC 2.0
/// request object gets -32600.
fn parse_request(line: &[u8]) -> std::result::Result<JsonRpcRequest, JsonRpcResponse> {
    let value: Value = serde_json::from_slice(line).map_err(|e| {
        log::warn!("Parse error: {}", e);
        JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {}", e))
    })?;

    let id = value.get("id").filter(|id| !id.is_null()).cloned();
    let invalid = |reason: String| {
        log::warn!("Invalid request: {}", reason);
        JsonRpcResponse::error(
            id.clone(),
            INVALID_REQUEST,
            format!("Invalid Request: {}", reason),
        )
    };

    if !value.is_object() {
        return Err(invalid("expected a single request object".to_string()));
    }

    let request: JsonRpcRequest =
        serde_json::from_value(value).map_err(|e| invalid(e.to_string()))?;

    if request.jsonrpc.as_deref() != Some("2.0") {
        return Err(invalid("jsonrpc must be \"2.0\"".to_string()));
    }

    Ok(request)
}

/// Wrap a tool outcome in its single text payload. Errors become an
/// indented `{"error": "..."}` with `isError` set.
fn render_outcome(outcome: std::result::Result<String, SearchError>) -> ToolCallResult {
    match outcome {
        Ok(text) => ToolCallResult::success(text),
        Err(e) => match serde_json::to_string_pretty(&ErrorResult::from(&e)) {
            Ok(text) => ToolCallResult::error(text),
            Err(encode) => ToolCallResult::error(format!("Failed to encode error: {}", encode)),
        },
    }
}

fn respond<T: Serialize>(id: Option<Value>, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, format!("Encode error: {}", e)),
    }
}

async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &JsonRpcResponse,
) -> Result<()> {
    let json = serde_json::to_string(response)?;
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}
