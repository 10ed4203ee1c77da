//! JSON-RPC 2.0 over newline-delimited stdio, as used by the Model Context
//! Protocol.

use edu_forum::ForumTools;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info, warn};

use crate::tools::{self, CallError};

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "edu-forum-mcp";

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

#[derive(Deserialize, Debug)]
pub struct Request {
    /// `None` for notifications. An explicit `null` id is kept.
    #[serde(default, deserialize_with = "present")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

#[derive(Serialize, Debug, PartialEq)]
pub struct Response {
    jsonrpc: &'static str,
    id: Value,
    #[serde(flatten)]
    outcome: Outcome,
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "lowercase")]
enum Outcome {
    Result(Value),
    Error(ErrorObject),
}

#[derive(Serialize, Debug, PartialEq)]
pub struct ErrorObject {
    pub code: i64,
    pub message: String,
}

impl Response {
    fn result(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            outcome: Outcome::Result(result),
        }
    }

    fn error(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            outcome: Outcome::Error(ErrorObject {
                code,
                message: message.into(),
            }),
        }
    }
}

#[derive(Deserialize, Debug)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// Serves requests one at a time, in arrival order.
#[derive(Debug)]
pub struct Server {
    tools: ForumTools,
}

impl Server {
    #[must_use]
    pub fn new(tools: ForumTools) -> Self {
        Self { tools }
    }

    /// Serves until `reader` reaches end of file.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(response) = self.handle_line(line).await {
                let mut frame = serde_json::to_vec(&response)?;
                frame.push(b'\n');
                writer.write_all(&frame).await?;
                writer.flush().await?;
            }
        }
        info!("stdin closed, shutting down");
        Ok(())
    }

    /// Handles one frame. Notifications get no response.
    pub async fn handle_line(&self, line: &str) -> Option<Response> {
        let value = match serde_json::from_str::<Value>(line) {
            Ok(value) => value,
            Err(err) => {
                warn!(%err, "Malformed frame");
                return Some(Response::error(
                    Value::Null,
                    PARSE_ERROR,
                    format!("Parse error: {err}"),
                ));
            }
        };
        let request = match serde_json::from_value::<Request>(value.clone()) {
            Ok(request) => request,
            Err(err) => {
                warn!(%err, "Invalid request");
                let id = match value.get("id") {
                    Some(id) => id.clone(),
                    None if value.is_object() => return None,
                    None => Value::Null,
                };
                return Some(Response::error(
                    id,
                    INVALID_REQUEST,
                    format!("Invalid request: {err}"),
                ));
            }
        };
        self.handle(request).await
    }

    pub async fn handle(&self, request: Request) -> Option<Response> {
        debug!(method = %request.method, id = ?request.id, "Request");
        let outcome = self.dispatch(&request.method, request.params).await;
        let Some(id) = request.id else {
            if let Err((code, message)) = outcome {
                debug!(code, error = %message, "Dropped error for notification");
            }
            return None;
        };
        Some(match outcome {
            Ok(result) => Response::result(id, result),
            Err((code, message)) => Response::error(id, code, message),
        })
    }

    async fn dispatch(&self, method: &str, params: Value) -> Result<Value, (i64, String)> {
        match method {
            "initialize" => Ok(json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": { "listChanged": false } },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": env!("CARGO_PKG_VERSION"),
                }
            })),
            "notifications/initialized" => {
                info!("Client initialized");
                Ok(json!({}))
            }
            "ping" => Ok(json!({})),
            "tools/list" => Ok(tools::definitions()),
            "tools/call" => {
                let CallParams { name, arguments } = serde_json::from_value(params)
                    .map_err(|err| (INVALID_PARAMS, format!("Invalid params: {err}")))?;
                match tools::call(&self.tools, &name, arguments).await {
                    Ok(text) => Ok(json!({
                        "content": [{ "type": "text", "text": text }],
                        "isError": false
                    })),
                    Err(err @ CallError::Summarize(_)) => {
                        error!(tool = %name, %err, "Tool failed");
                        Err((INTERNAL_ERROR, err.to_string()))
                    }
                    Err(err) => {
                        warn!(tool = %name, %err, "Rejected tool call");
                        Err((INVALID_PARAMS, err.to_string()))
                    }
                }
            }
            method => Err((METHOD_NOT_FOUND, format!("Method not found: {method}"))),
        }
    }
}
