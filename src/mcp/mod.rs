//! MCP Layer - JSON-RPC over stdio for tool clients
//!
//! This module provides:
//! - Message types for requests, responses and MCP payloads
//! - Newline-delimited JSON codec
//! - Session server dispatching to the tool gateway

pub mod codec;
pub mod messages;
pub mod server;

pub use codec::{Frame, NdJsonCodec};
pub use messages::{
    CallToolResult, ContentBlock, ErrorCode, Incoming, JsonRpcError, JsonRpcResponse, Methods, RequestId,
    SUPPORTED_PROTOCOL_VERSIONS,
};
pub use server::McpServer;
