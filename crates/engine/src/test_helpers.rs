//! Shared test helpers for engine tests.

use mythos_core::error::ProviderError;
use mythos_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use std::sync::Mutex;

/// A mock provider that replays scripted results in order and records
/// every request it receives.
///
/// Panics if more calls are made than results provided.
pub struct ScriptedProvider {
    results: Mutex<Vec<Result<ProviderResponse, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(results: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            results: Mutex::new(results),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A provider that answers once with `text`.
    pub fn single_text(text: &str) -> Self {
        Self::new(vec![Ok(make_text_response(text))])
    }

    /// A provider whose only call fails with `error`.
    pub fn failing(error: ProviderError) -> Self {
        Self::new(vec![Err(error)])
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted_mock"
    }

    async fn generate(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let mut results = self.results.lock().unwrap();

        if results.is_empty() {
            panic!(
                "ScriptedProvider: no more results (call #{})",
                requests.len() + 1
            );
        }

        requests.push(request);
        results.remove(0)
    }
}

/// Create a plain text response.
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        text: text.to_string(),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}
