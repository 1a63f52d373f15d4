//! Error types for the search gateway
//!
//! Centralized error handling using thiserror.

use std::fmt;

use thiserror::Error;

/// Classification of a failed tool call, carried on the wire as `data.kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnknownTool,
    InvalidArguments,
    ConfigurationError,
    UpstreamError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownTool => "UnknownTool",
            Self::InvalidArguments => "InvalidArguments",
            Self::ConfigurationError => "ConfigurationError",
            Self::UpstreamError => "UpstreamError",
        }
    }

    /// Whether a caller may reasonably try the same call again
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::UpstreamError)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All error types that can occur while serving a tool call
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Caller referenced a tool this server does not provide
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Missing or malformed tool arguments
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Deployment misconfiguration, e.g. missing credential
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network failure, non-success status or malformed upstream body
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    /// Wire classification of this error.
    ///
    /// IO failures never come out of a tool call; they map to
    /// `ConfigurationError`.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownTool(_) => ErrorKind::UnknownTool,
            Self::InvalidArguments(_) => ErrorKind::InvalidArguments,
            Self::Configuration(_) | Self::Io(_) => ErrorKind::ConfigurationError,
            Self::Upstream(_) => ErrorKind::UpstreamError,
        }
    }
}

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;
