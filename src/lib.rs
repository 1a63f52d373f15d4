//! openrouter-search - an MCP server exposing a single `web_search` tool
//!
//! Each call forwards the caller's query to the OpenRouter chat completions
//! API and returns the model's text answer unchanged.

pub mod config;
pub mod error;
pub mod llm;
pub mod mcp;
pub mod tools;

pub use error::{ErrorKind, GatewayError, Result};
