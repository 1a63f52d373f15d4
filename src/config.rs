//! Runtime configuration
//!
//! Everything has a compiled-in default; a handful of environment variables
//! may override the upstream settings. The credential itself is never stored
//! here, only the name of the variable it is read from at call time.

use std::time::Duration;

/// Environment variable holding the OpenRouter API key
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

pub const ENDPOINT_ENV: &str = "OPENROUTER_SEARCH_ENDPOINT";
pub const MODEL_ENV: &str = "OPENROUTER_SEARCH_MODEL";
pub const TIMEOUT_ENV: &str = "OPENROUTER_SEARCH_TIMEOUT_MS";
pub const REFERER_ENV: &str = "OPENROUTER_SEARCH_REFERER";
pub const TITLE_ENV: &str = "OPENROUTER_SEARCH_TITLE";

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub upstream: UpstreamConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key_env: String,
    pub referer: String,
    pub title: String,
    pub timeout_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            model: "google/gemini-pro".to_string(),
            api_key_env: API_KEY_ENV.to_string(),
            referer: "http://localhost".to_string(),
            title: "OpenRouter Search MCP Server".to_string(),
            timeout_ms: 60_000,
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Point the client at a different endpoint (local test servers, proxies)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Read the credential from a different environment variable
    pub fn with_api_key_env(mut self, name: impl Into<String>) -> Self {
        self.api_key_env = name.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
    pub max_frame_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "openrouter-search-server".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            max_frame_bytes: 16 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Defaults with `OPENROUTER_SEARCH_*` overrides from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults with overrides taken from an arbitrary lookup function
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let upstream = &mut config.upstream;

        if let Some(endpoint) = non_empty(lookup(ENDPOINT_ENV)) {
            upstream.endpoint = endpoint;
        }
        if let Some(model) = non_empty(lookup(MODEL_ENV)) {
            upstream.model = model;
        }
        if let Some(referer) = non_empty(lookup(REFERER_ENV)) {
            upstream.referer = referer;
        }
        if let Some(title) = non_empty(lookup(TITLE_ENV)) {
            upstream.title = title;
        }
        if let Some(raw) = non_empty(lookup(TIMEOUT_ENV)) {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => upstream.timeout_ms = ms,
                _ => log::warn!("Ignoring invalid {}={:?}, using {}ms", TIMEOUT_ENV, raw, upstream.timeout_ms),
            }
        }

        config
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_upstream_defaults() {
        let config = UpstreamConfig::default();
        assert_eq!(config.endpoint, "https://openrouter.ai/api/v1/chat/completions");
        assert_eq!(config.model, "google/gemini-pro");
        assert_eq!(config.api_key_env, "OPENROUTER_API_KEY");
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_server_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.name, "openrouter-search-server");
        assert_eq!(config.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(config.max_frame_bytes, 16 * 1024 * 1024);
    }

    #[test]
    fn test_from_lookup_without_overrides() {
        let config = Config::from_lookup(lookup_from(&[]));
        assert_eq!(config.upstream.model, UpstreamConfig::default().model);
        assert_eq!(config.upstream.endpoint, UpstreamConfig::default().endpoint);
    }

    #[test]
    fn test_from_lookup_applies_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            (ENDPOINT_ENV, "http://127.0.0.1:8080/v1/chat/completions"),
            (MODEL_ENV, "perplexity/sonar"),
            (TIMEOUT_ENV, "1500"),
            (REFERER_ENV, "https://example.com"),
            (TITLE_ENV, "Search"),
        ]));

        assert_eq!(config.upstream.endpoint, "http://127.0.0.1:8080/v1/chat/completions");
        assert_eq!(config.upstream.model, "perplexity/sonar");
        assert_eq!(config.upstream.timeout_ms, 1500);
        assert_eq!(config.upstream.referer, "https://example.com");
        assert_eq!(config.upstream.title, "Search");
    }

    #[test]
    fn test_from_lookup_ignores_invalid_timeout() {
        let config = Config::from_lookup(lookup_from(&[(TIMEOUT_ENV, "soon")]));
        assert_eq!(config.upstream.timeout_ms, 60_000);

        let config = Config::from_lookup(lookup_from(&[(TIMEOUT_ENV, "0")]));
        assert_eq!(config.upstream.timeout_ms, 60_000);
    }

    #[test]
    fn test_from_lookup_ignores_blank_values() {
        let config = Config::from_lookup(lookup_from(&[(MODEL_ENV, "   ")]));
        assert_eq!(config.upstream.model, "google/gemini-pro");
    }

    #[test]
    fn test_builders() {
        let config = UpstreamConfig::default()
            .with_endpoint("http://localhost:1/x")
            .with_api_key_env("OTHER_KEY")
            .with_timeout_ms(250);
        assert_eq!(config.endpoint, "http://localhost:1/x");
        assert_eq!(config.api_key_env, "OTHER_KEY");
        assert_eq!(config.timeout(), Duration::from_millis(250));
    }
}
