//! LLM Client Layer - OpenRouter chat completions
//!
//! This module provides:
//! - Wire types for the completion request and response
//! - CompletionClient trait for API abstraction
//! - OpenRouterClient implementation

pub mod client;
pub mod openrouter;
pub mod types;

pub use client::{CompletionClient, MockCompletionClient};
pub use openrouter::OpenRouterClient;
pub use types::{Message, Role, UNEXPECTED_FORMAT, UpstreamRequest, UpstreamResponse};
