//! In-memory provider for tests and local development.

use super::{GenerateRequest, GenerateResponse, Provider, ProviderError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays queued results in order and records every request it receives.
#[derive(Default)]
pub struct MockProvider {
    responses: Mutex<VecDeque<Result<GenerateResponse, ProviderError>>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw response.
    pub fn push_response(&self, response: GenerateResponse) -> &Self {
        self.lock_responses().push_back(Ok(response));
        self
    }

    /// Queue a response whose first candidate carries `text`.
    pub fn push_text(&self, text: &str) -> &Self {
        let response = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": text}]},
                "finishReason": "STOP"
            }]
        }))
        .unwrap_or_default();
        self.push_response(response)
    }

    pub fn push_error(&self, error: ProviderError) -> &Self {
        self.lock_responses().push_back(Err(error));
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    fn lock_responses(
        &self,
    ) -> std::sync::MutexGuard<'_, VecDeque<Result<GenerateResponse, ProviderError>>> {
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, ProviderError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        self.lock_responses()
            .pop_front()
            .unwrap_or_else(|| {
                Err(ProviderError::Other(
                    "mock provider has no queued response".into(),
                ))
            })
    }
}
