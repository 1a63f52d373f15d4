//! Completion client trait and a scripted mock

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{GatewayError, Result};
use crate::llm::types::UpstreamRequest;

/// Stateless completion client - each call is independent
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send one completion request and return the text of the first choice
    async fn complete(&self, request: UpstreamRequest) -> Result<String>;

    /// Model identifier requests are built for
    fn model(&self) -> &str;
}

/// Mock client for testing - returns scripted responses in order and records
/// every request it receives.
pub struct MockCompletionClient {
    model: String,
    responses: Mutex<VecDeque<Result<String>>>,
    requests: Mutex<Vec<UpstreamRequest>>,
}

impl MockCompletionClient {
    pub fn new(responses: Vec<Result<String>>) -> Self {
        Self {
            model: "mock-model".to_string(),
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Mock that answers every call with the same text
    pub fn replying(text: impl Into<String>) -> Self {
        Self::new(vec![Ok(text.into())])
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<UpstreamRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }
}

impl Default for MockCompletionClient {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, request: UpstreamRequest) -> Result<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        let mut responses = self
            .responses
            .lock()
            .map_err(|_| GatewayError::Upstream("mock client poisoned".to_string()))?;

        // The last scripted success repeats once the queue is down to it
        if responses.len() == 1 {
            if let Some(Ok(text)) = responses.front() {
                return Ok(text.clone());
            }
        }

        responses
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::Upstream("no scripted response".to_string())))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_returns_scripted_in_order() {
        let mock = MockCompletionClient::new(vec![Ok("one".into()), Ok("two".into())]);

        let first = mock.complete(UpstreamRequest::for_query("m", "a")).await.unwrap();
        let second = mock.complete(UpstreamRequest::for_query("m", "b")).await.unwrap();

        assert_eq!(first, "one");
        assert_eq!(second, "two");
        assert_eq!(mock.call_count(), 2);
        assert_eq!(mock.requests()[1].messages[0].content, "b");
    }

    #[tokio::test]
    async fn test_mock_repeats_last_success() {
        let mock = MockCompletionClient::replying("same");
        for _ in 0..3 {
            assert_eq!(mock.complete(UpstreamRequest::for_query("m", "q")).await.unwrap(), "same");
        }
    }

    #[tokio::test]
    async fn test_mock_scripted_error() {
        let mock = MockCompletionClient::new(vec![Err(GatewayError::Upstream("boom".into()))]);
        let err = mock.complete(UpstreamRequest::for_query("m", "q")).await.unwrap_err();
        assert!(matches!(err, GatewayError::Upstream(ref m) if m == "boom"));
    }

    #[tokio::test]
    async fn test_mock_empty_script() {
        let mock = MockCompletionClient::default();
        assert!(mock.complete(UpstreamRequest::for_query("m", "q")).await.is_err());
        assert_eq!(mock.model(), "mock-model");
    }
}
