//! Chat collaborator contracts
//!
//! The relays never talk HTTP themselves. They call one of these traits and
//! treat whatever sits behind it as opaque: timeouts, retries and model
//! specifics all belong to the implementation.

use crate::models::gemini::ChatResponse;
use crate::models::openai::{ChatOptions, ChatResult, MessageItem};
use async_trait::async_trait;
use thiserror::Error;

/// Error types for chat collaborator calls
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0}")]
    NotConfigured(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("HTTP {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("{0}")]
    Unexpected(String),
}

impl ProviderError {
    /// Rate limits and server-side failures may clear up on their own
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::RateLimit(_) => true,
            ProviderError::ApiError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Single-prompt chat service
#[async_trait]
pub trait GeminiChat: Send + Sync {
    /// Send one prompt and return the reply text or an error message
    async fn chat_simple(&self, prompt: &str) -> Result<ChatResponse, ProviderError>;

    /// Get the provider name
    fn provider_name(&self) -> &str {
        "gemini"
    }
}

/// Multi-turn chat service with optional web search
#[async_trait]
pub trait OpenAIChat: Send + Sync {
    /// Send a conversation and return the reply, or `None` when the
    /// service produced no result at all
    async fn chat(
        &self,
        history: &[MessageItem],
        options: &ChatOptions,
    ) -> Result<Option<ChatResult>, ProviderError>;

    /// Get the provider name
    fn provider_name(&self) -> &str {
        "openai"
    }
}
