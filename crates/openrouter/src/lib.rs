//! Client for the OpenRouter chat-completions API.
//!
//! - [`api`] -- HTTP client ([`OpenRouterClient`]) and error type.
//! - [`messages`] -- request/response wire types and reply-text extraction.
//!
//! Callers depend on the [`CompletionClient`] trait so tests can substitute
//! a canned implementation.

pub mod api;
pub mod messages;

use async_trait::async_trait;

pub use api::{OpenRouterClient, OpenRouterConfig, OpenRouterError};
pub use messages::CompletionRequest;

/// A text-completion backend: one system + one user instruction in, reply
/// text out.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, OpenRouterError>;
}
