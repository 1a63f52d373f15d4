//! Tool gateway - advertises the search tool and turns calls into upstream requests

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GatewayError, Result};
use crate::llm::{CompletionClient, UpstreamRequest};

use super::definition::{ToolDescriptor, WEB_SEARCH};

/// One tool invocation as received from the transport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRequest {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

impl CallRequest {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// Validates calls against the single registered tool and forwards them upstream
pub struct ToolGateway {
    tools: Vec<ToolDescriptor>,
    client: Arc<dyn CompletionClient>,
}

impl ToolGateway {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            tools: vec![ToolDescriptor::web_search()],
            client,
        }
    }

    /// Advertised tools, in registration order
    pub fn list_tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    /// Run one tool call and return the upstream text verbatim
    pub async fn call_tool(&self, request: CallRequest) -> Result<String> {
        if !self.tools.iter().any(|t| t.name == request.name) {
            return Err(GatewayError::UnknownTool(request.name));
        }

        let query = extract_query(&request.arguments)?;
        log::debug!("Forwarding {} query ({} bytes) to {}", WEB_SEARCH, query.len(), self.client.model());

        let upstream = UpstreamRequest::for_query(self.client.model(), query);
        let content = self.client.complete(upstream).await?;

        log::debug!("{} returned {} bytes", WEB_SEARCH, content.len());
        Ok(content)
    }
}

/// Pull the `query` argument out of a call, rejecting anything but a non-blank string
fn extract_query(arguments: &Value) -> Result<&str> {
    let args = match arguments {
        Value::Object(map) => map,
        Value::Null => return Err(GatewayError::InvalidArguments("missing required argument: query".to_string())),
        _ => return Err(GatewayError::InvalidArguments("arguments must be an object".to_string())),
    };

    match args.get("query") {
        None | Some(Value::Null) => Err(GatewayError::InvalidArguments("missing required argument: query".to_string())),
        Some(Value::String(query)) if query.trim().is_empty() => {
            Err(GatewayError::InvalidArguments("query must not be empty".to_string()))
        }
        Some(Value::String(query)) => Ok(query.as_str()),
        Some(_) => Err(GatewayError::InvalidArguments("query must be a string".to_string())),
    }
}
