//! MCP Server - serves the tool gateway over a byte stream pair
//!
//! Provides:
//! - Frame decoding and request dispatch
//! - One task per `tools/call`, so slow upstream calls overlap
//! - A single writer task so response frames never interleave
//! - Cancellation of in-flight calls via `notifications/cancelled` or shutdown

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures::{SinkExt, StreamExt};
use serde::Serialize;
use serde_json::{Value, json};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite};
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;
use crate::error::{GatewayError, Result};
use crate::mcp::codec::{Frame, NdJsonCodec};
use crate::mcp::messages::{
    CallToolResult, CancelledParams, ErrorCode, Incoming, InitializeResult, JsonRpcError, JsonRpcResponse,
    ListToolsResult, Methods, RequestId, negotiate_protocol_version,
};
use crate::tools::{CallRequest, ToolGateway};

/// Channel capacity between dispatch and the writer task
const OUTBOUND_CAPACITY: usize = 64;

type InFlight = Arc<Mutex<HashMap<RequestId, CancellationToken>>>;

/// MCP server for one client session
pub struct McpServer {
    gateway: Arc<ToolGateway>,
    config: ServerConfig,
    shutdown: CancellationToken,
}

/// Per-session state shared with call tasks
struct Session {
    outbound: mpsc::Sender<JsonRpcResponse>,
    in_flight: InFlight,
}

impl McpServer {
    pub fn new(gateway: ToolGateway, config: ServerConfig) -> Self {
        Self {
            gateway: Arc::new(gateway),
            config,
            shutdown: CancellationToken::new(),
        }
    }

    /// Token that stops the session and aborts every in-flight call when cancelled
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Serve on the process's stdin/stdout until stdin closes
    pub async fn serve_stdio(&self) -> Result<()> {
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve one session until the reader reaches EOF or shutdown is signalled.
    ///
    /// At EOF, calls already in flight run to completion and their responses
    /// are written before returning. Shutdown aborts them instead.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin + Send,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let max_length = self.config.max_frame_bytes;
        let mut frames = FramedRead::new(reader, NdJsonCodec::<Value>::with_max_length(max_length));
        let mut sink = FramedWrite::new(writer, NdJsonCodec::<JsonRpcResponse>::with_max_length(max_length));

        let (outbound, mut outbound_rx) = mpsc::channel::<JsonRpcResponse>(OUTBOUND_CAPACITY);
        let writer_task = tokio::spawn(async move {
            while let Some(response) = outbound_rx.recv().await {
                let id = response.id.clone();
                if let Err(e) = sink.send(response).await {
                    log::error!("Failed to write response {:?}: {}", id, e);
                    return Err(GatewayError::Io(e));
                }
            }
            Ok(())
        });

        let session = Session {
            outbound,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        };

        let mut read_error = None;
        loop {
            let frame = tokio::select! {
                _ = self.shutdown.cancelled() => {
                    log::info!("Shutdown requested, aborting in-flight calls");
                    break;
                }
                frame = frames.next() => match frame {
                    Some(frame) => frame,
                    None => {
                        log::info!("Input closed, finishing in-flight calls");
                        break;
                    }
                },
            };

            match frame {
                Ok(Frame::Message(value)) => self.dispatch(Incoming::from_value(value), &session).await,
                Ok(Frame::Malformed(reason)) => {
                    log::warn!("Discarding malformed frame: {}", reason);
                    session
                        .reply(JsonRpcResponse::error(
                            None,
                            JsonRpcError::parse_error(format!("Parse error: {}", reason)),
                        ))
                        .await;
                }
                Err(e) => {
                    log::error!("Input stream failed: {}", e);
                    read_error = Some(e);
                    break;
                }
            }
        }

        // The writer ends once every call task has dropped its sender
        drop(session);

        match writer_task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(e) => log::error!("Writer task panicked: {}", e),
        }

        match read_error {
            Some(e) => Err(GatewayError::Io(e)),
            None => Ok(()),
        }
    }

    async fn dispatch(&self, message: Incoming, session: &Session) {
        match message {
            Incoming::Request { id, method, params } => {
                log::debug!("<- {} (id {})", method, id);
                match method.as_str() {
                    Methods::INITIALIZE => {
                        let requested = params.get("protocolVersion").and_then(Value::as_str);
                        let version = negotiate_protocol_version(requested);
                        log::info!("Client initialized, protocol {} (requested {:?})", version, requested);
                        let result = InitializeResult::new(version, &self.config.name, &self.config.version);
                        session.reply(to_response(id, &result)).await;
                    }
                    Methods::PING => session.reply(JsonRpcResponse::success(id, json!({}))).await,
                    Methods::TOOLS_LIST => {
                        let result = ListToolsResult {
                            tools: self.gateway.list_tools().to_vec(),
                        };
                        session.reply(to_response(id, &result)).await;
                    }
                    Methods::TOOLS_CALL => self.spawn_call(id, params, session).await,
                    other => {
                        log::warn!("Unknown method: {}", other);
                        session
                            .reply(JsonRpcResponse::error(Some(id), JsonRpcError::method_not_found(other)))
                            .await;
                    }
                }
            }
            Incoming::Notification { method, params } => match method.as_str() {
                Methods::CANCELLED => match serde_json::from_value::<CancelledParams>(params) {
                    Ok(cancelled) => session.cancel(&cancelled),
                    Err(e) => log::warn!("Ignoring malformed cancellation: {}", e),
                },
                Methods::INITIALIZED => log::debug!("Client reported initialized"),
                other => log::debug!("Ignoring notification {}", other),
            },
            Incoming::Response { id } => log::debug!("Ignoring unsolicited response {}", id),
            Incoming::Invalid { id, reason } => {
                log::warn!("Invalid request: {}", reason);
                session
                    .reply(JsonRpcResponse::error(id, JsonRpcError::invalid_request(reason)))
                    .await;
            }
        }
    }

    /// Run a `tools/call` in its own task; its response is sent when it finishes
    async fn spawn_call(&self, id: RequestId, params: Value, session: &Session) {
        let request = match serde_json::from_value::<CallRequest>(params) {
            Ok(request) => request,
            Err(e) => {
                let err = GatewayError::InvalidArguments(format!("tools/call params: {}", e));
                session
                    .reply(JsonRpcResponse::error(Some(id), JsonRpcError::from(&err)))
                    .await;
                return;
            }
        };

        let token = self.shutdown.child_token();
        let duplicate = session
            .in_flight
            .lock()
            .map(|mut in_flight| {
                if in_flight.contains_key(&id) {
                    return true;
                }
                in_flight.insert(id.clone(), token.clone());
                false
            })
            .unwrap_or(false);

        if duplicate {
            log::warn!("Request id {} reused while still in flight", id);
            let message = format!("Request id {} is already in flight", id);
            session
                .reply(JsonRpcResponse::error(Some(id), JsonRpcError::invalid_request(message)))
                .await;
            return;
        }

        let max_length = self.config.max_frame_bytes;
        let gateway = Arc::clone(&self.gateway);
        let outbound = session.outbound.clone();
        let in_flight = Arc::clone(&session.in_flight);

        tokio::spawn(async move {
            let tool = request.name.clone();
            let outcome = tokio::select! {
                _ = token.cancelled() => None,
                result = gateway.call_tool(request) => Some(result),
            };

            if let Ok(mut in_flight) = in_flight.lock() {
                in_flight.remove(&id);
            }

            let response = match outcome {
                None => {
                    log::info!("Call {} to {} cancelled", id, tool);
                    return;
                }
                Some(Ok(text)) => {
                    log::info!("Call {} to {} succeeded", id, tool);
                    fit_frame(to_response(id, &CallToolResult::text(text)), max_length)
                }
                Some(Err(e)) => {
                    log::warn!("Call {} to {} failed: {}", id, tool, e);
                    JsonRpcResponse::error(Some(id), JsonRpcError::from(&e))
                }
            };

            if outbound.send(response).await.is_err() {
                log::warn!("Session closed before response could be sent");
            }
        });
    }
}

impl Session {
    async fn reply(&self, response: JsonRpcResponse) {
        if self.outbound.send(response).await.is_err() {
            log::warn!("Writer closed; dropping response");
        }
    }

    fn cancel(&self, cancelled: &CancelledParams) {
        let token = self
            .in_flight
            .lock()
            .ok()
            .and_then(|in_flight| in_flight.get(&cancelled.request_id).cloned());

        match token {
            Some(token) => {
                log::info!(
                    "Cancelling request {} ({})",
                    cancelled.request_id,
                    cancelled.reason.as_deref().unwrap_or("no reason given")
                );
                token.cancel();
            }
            None => log::debug!("Cancellation for unknown or finished request {}", cancelled.request_id),
        }
    }
}

/// Swap a response that would not fit in one frame for an upstream error
fn fit_frame(response: JsonRpcResponse, max_length: usize) -> JsonRpcResponse {
    let length = match serde_json::to_vec(&response) {
        Ok(encoded) => encoded.len(),
        Err(_) => return response,
    };
    if length <= max_length {
        return response;
    }

    log::warn!("Response to {:?} is {} bytes, over the {} byte frame limit", response.id, length, max_length);
    let err = GatewayError::Upstream(format!(
        "response too large: {} bytes exceeds the {} byte frame limit",
        length, max_length
    ));
    JsonRpcResponse::error(response.id, JsonRpcError::from(&err))
}

fn to_response<T: Serialize>(id: RequestId, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => {
            log::error!("Failed to serialize result for {}: {}", id, e);
            JsonRpcResponse::error(
                Some(id),
                JsonRpcError::new(ErrorCode::INTERNAL_ERROR, "Failed to serialize result"),
            )
        }
    }
}
