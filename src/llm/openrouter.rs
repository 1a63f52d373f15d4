//! OpenRouter API client implementation
//!
//! This module implements the CompletionClient trait for OpenRouter's
//! OpenAI-compatible chat completions endpoint.

use async_trait::async_trait;
use reqwest::Client;

use crate::config::UpstreamConfig;
use crate::error::{GatewayError, Result};
use crate::llm::client::CompletionClient;
use crate::llm::types::{ErrorEnvelope, UpstreamRequest, UpstreamResponse};

/// Longest slice of a raw upstream body echoed back in an error message
const MAX_ERROR_SNIPPET: usize = 200;

/// OpenRouter API client
pub struct OpenRouterClient {
    client: Client,
    config: UpstreamConfig,
    api_key: Option<String>,
}

impl OpenRouterClient {
    /// Create a new OpenRouter client
    ///
    /// The API key is read from `config.api_key_env` on every call, so a
    /// missing key surfaces as a call failure rather than a startup error.
    pub fn new(config: UpstreamConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| GatewayError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            api_key: None,
        })
    }

    /// Create a client with an explicit API key
    pub fn with_api_key(api_key: impl Into<String>, config: UpstreamConfig) -> Result<Self> {
        let mut client = Self::new(config)?;
        client.api_key = Some(api_key.into());
        Ok(client)
    }

    /// Resolve the bearer credential for this call
    fn resolve_api_key(&self) -> Result<String> {
        let key = match &self.api_key {
            Some(key) => Some(key.clone()),
            None => std::env::var(&self.config.api_key_env).ok(),
        };

        key.filter(|k| !k.trim().is_empty()).ok_or_else(|| {
            GatewayError::Configuration(format!("missing credential: {} is not set", self.config.api_key_env))
        })
    }

    /// Send a request and return the raw success body
    async fn send_request(&self, api_key: &str, request: &UpstreamRequest) -> Result<String> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .header("HTTP-Referer", &self.config.referer)
            .header("X-Title", &self.config.title)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                log::error!("Request to {} failed: {:?}", self.config.endpoint, e);
                if e.is_timeout() {
                    GatewayError::Upstream(format!("Request timed out after {}ms", self.config.timeout_ms))
                } else {
                    GatewayError::Upstream(format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            log::error!("Failed to read upstream body (status {}): {:?}", status, e);
            GatewayError::Upstream(format!("Failed to read response body: {}", e))
        })?;

        if !status.is_success() {
            log::warn!("Upstream returned {}: {}", status, body);
            let detail = ErrorEnvelope::message_from(&body)
                .or_else(|| snippet(&body))
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());
            return Err(GatewayError::Upstream(format!("API error {}: {}", status.as_u16(), detail)));
        }

        Ok(body)
    }
}

/// Short, single-line excerpt of a non-JSON error body
fn snippet(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut excerpt: String = trimmed.chars().take(MAX_ERROR_SNIPPET).collect();
    if excerpt.len() < trimmed.len() {
        excerpt.push_str("...");
    }
    Some(excerpt.replace(['\r', '\n'], " "))
}

#[async_trait]
impl CompletionClient for OpenRouterClient {
    async fn complete(&self, request: UpstreamRequest) -> Result<String> {
        let api_key = self.resolve_api_key()?;
        let body = self.send_request(&api_key, &request).await?;
        UpstreamResponse::extract_content(&body)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

impl std::fmt::Debug for OpenRouterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterClient")
            .field("endpoint", &self.config.endpoint)
            .field("model", &self.config.model)
            .field("api_key_env", &self.config.api_key_env)
            .finish()
    }
}
