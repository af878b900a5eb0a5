//! Mock generation backend for deterministic testing.
//!
//! Always compiled so downstream crates (the pipeline's tests in particular)
//! can drive the extraction and quiz contracts without a live model.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use knowledger_core::{Error, GenerationBackend, Result};

/// Mock generation backend with scripted responses.
#[derive(Clone, Default)]
pub struct MockGenerationBackend {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    /// Responses returned in order; the last one repeats once drained.
    queued: VecDeque<String>,
    default_response: Option<String>,
    fail: bool,
    prompts: Vec<String>,
}

impl MockGenerationBackend {
    /// Create a new mock backend with no scripted responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the response returned for every call.
    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.state.lock().unwrap().default_response = Some(response.into());
        self
    }

    /// Queue a response to return once, in FIFO order, before the default.
    pub fn push_response(&self, response: impl Into<String>) {
        self.state.lock().unwrap().queued.push_back(response.into());
    }

    /// Make every call fail, simulating an unavailable service.
    pub fn failing(self) -> Self {
        self.state.lock().unwrap().fail = true;
        self
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.state.lock().unwrap().prompts.clone()
    }
}

#[async_trait]
impl GenerationBackend for MockGenerationBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        state.prompts.push(prompt.to_string());

        if state.fail {
            return Err(Error::Inference("mock backend unavailable".to_string()));
        }
        if let Some(next) = state.queued.pop_front() {
            return Ok(next);
        }
        state
            .default_response
            .clone()
            .ok_or_else(|| Error::Inference("mock backend has no scripted response".to_string()))
    }

    async fn generate_with_system(&self, _system: &str, prompt: &str) -> Result<String> {
        self.generate(prompt).await
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_returns_default_response() {
        let backend = MockGenerationBackend::new().with_response("hello");
        assert_eq!(backend.generate("prompt").await.unwrap(), "hello");
        assert_eq!(backend.prompts(), vec!["prompt".to_string()]);
    }

    #[tokio::test]
    async fn test_mock_queued_responses_drain_in_order() {
        let backend = MockGenerationBackend::new().with_response("default");
        backend.push_response("first");
        backend.push_response("second");

        assert_eq!(backend.generate("a").await.unwrap(), "first");
        assert_eq!(backend.generate("b").await.unwrap(), "second");
        assert_eq!(backend.generate("c").await.unwrap(), "default");
    }

    #[tokio::test]
    async fn test_mock_failing() {
        let backend = MockGenerationBackend::new().failing();
        assert!(backend.generate("prompt").await.is_err());
    }
}
