//! Tool descriptors
//!
//! Defines the shape a tool is advertised with, and the one tool this server
//! provides.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Name the search tool is registered and called under
pub const WEB_SEARCH: &str = "web_search";

/// A tool as advertised to clients in `tools/list`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    /// Tool name (e.g., "web_search")
    pub name: String,
    /// Human-readable description for the calling model
    pub description: String,
    /// JSON schema for input parameters
    pub input_schema: Value,
}

impl ToolDescriptor {
    /// The `web_search` tool: forwards a query to the completion API
    pub fn web_search() -> Self {
        Self {
            name: WEB_SEARCH.to_string(),
            description: "Perform a web search using OpenRouter API".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search query"
                    }
                },
                "required": ["query"]
            }),
        }
    }
}
