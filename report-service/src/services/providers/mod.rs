//! Completion provider abstractions and implementations.
//!
//! This module provides a trait-based abstraction for chat-completion
//! backends, allowing easy swapping between the real OpenAI client and
//! a mock for tests.

pub mod mock;
pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// A two-message conversation sent to the completion service.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Fixed system instruction framing the assistant's role.
    pub system: String,

    /// The user prompt built from caller input.
    pub user: String,

    /// Sampling temperature.
    pub temperature: f32,

    /// Maximum output tokens.
    pub max_tokens: u32,
}

/// Trait for chat-completion providers (e.g., OpenAI).
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Issue one completion call and return the first choice's text.
    async fn complete(&self, request: &ChatRequest) -> Result<String, ProviderError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), ProviderError>;
}
