//! Mock provider implementation for testing.

use super::{ChatRequest, CompletionProvider, ProviderError};
use async_trait::async_trait;

/// Mock completion provider returning a canned response.
pub struct MockTextProvider {
    response: Result<String, String>,
}

impl MockTextProvider {
    /// Provider that answers every request with `response`.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: Ok(response.into()),
        }
    }

    /// Provider that fails every request with an API error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            response: Err(message.into()),
        }
    }
}

#[async_trait]
impl CompletionProvider for MockTextProvider {
    async fn complete(&self, _request: &ChatRequest) -> Result<String, ProviderError> {
        match &self.response {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(ProviderError::ApiError(message.clone())),
        }
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}
