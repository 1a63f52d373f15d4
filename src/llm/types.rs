//! Chat completion wire types
//!
//! Request and response shapes for an OpenAI-style `/chat/completions`
//! endpoint, as spoken by OpenRouter.

use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, Result};

/// Message returned when a success response lacks usable content
pub const UNEXPECTED_FORMAT: &str = "unexpected response format";

/// Role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Body of one outbound completion request.
///
/// Built fresh for every tool call; the credential and identifying headers
/// are attached by the client when the request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamRequest {
    pub model: String,
    pub messages: Vec<Message>,
}

impl UpstreamRequest {
    /// Single user-role message carrying the query verbatim
    pub fn for_query(model: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![Message::user(query)],
        }
    }
}

/// Decoded completion response. Only the fields we read are modelled.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl UpstreamResponse {
    /// Text of the first choice, if it is present and non-empty
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_deref())
            .filter(|content| !content.is_empty())
    }

    /// Extract the completion text from a raw success body.
    ///
    /// Anything that does not decode to `choices[0].message.content` with a
    /// non-empty string is an upstream error.
    pub fn extract_content(body: &str) -> Result<String> {
        let response: UpstreamResponse = serde_json::from_str(body).map_err(|e| {
            log::warn!("Upstream body is not a completion response ({}): {}", e, body);
            GatewayError::Upstream(UNEXPECTED_FORMAT.to_string())
        })?;

        match response.first_content() {
            Some(content) => Ok(content.to_string()),
            None => {
                log::warn!("Upstream response has no usable choice content: {}", body);
                Err(GatewayError::Upstream(UNEXPECTED_FORMAT.to_string()))
            }
        }
    }
}

/// Error envelope returned by OpenRouter on failure: `{"error": {"message": ...}}`
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorEnvelope {
    /// Upstream's own error message, when the body carries one
    pub fn message_from(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .and_then(|e| e.error.message)
            .filter(|m| !m.trim().is_empty())
    }
}
