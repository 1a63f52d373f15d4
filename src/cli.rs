//! Command-line interface.
//!
//! The server takes no options; everything is configured through the
//! environment. clap still provides `--help` and `--version`.

use clap::Parser;

/// MCP server exposing a `web_search` tool backed by OpenRouter
#[derive(Parser, Debug)]
#[command(name = "openrouter-search-server")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
Speaks MCP (JSON-RPC 2.0) on stdin/stdout. Logs go to stderr.

Environment:
  OPENROUTER_API_KEY             API key, read on every call (required)
  OPENROUTER_SEARCH_ENDPOINT     Chat completions URL
  OPENROUTER_SEARCH_MODEL        Model identifier (default google/gemini-pro)
  OPENROUTER_SEARCH_TIMEOUT_MS   Upstream request timeout (default 60000)
  OPENROUTER_SEARCH_REFERER      HTTP-Referer header value
  OPENROUTER_SEARCH_TITLE        X-Title header value
  RUST_LOG                       Log filter (default info)")]
pub struct Cli {}
