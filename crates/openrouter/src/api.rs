//! HTTP client for the OpenRouter chat-completions endpoint.
//!
//! One request per call, bounded by [`GENERATION_TIMEOUT`], never retried.

use std::time::Duration;

use async_trait::async_trait;

use crate::messages::{upstream_error_message, ChatCompletionBody, ChatCompletionResponse};
use crate::{CompletionClient, CompletionRequest};

/// Timeout for a single completion request.
pub const GENERATION_TIMEOUT: Duration = Duration::from_secs(20);

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default model slug.
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

/// Value sent in the `X-Title` attribution header.
pub const APP_TITLE: &str = "ScrollStop Caption Generator";

/// Message used when the upstream error body carries none.
pub const FALLBACK_ERROR_MESSAGE: &str = "OpenRouter request failed";

/// Connection settings for [`OpenRouterClient`].
#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    /// Bearer API key.
    pub api_key: String,
    /// Model slug, e.g. `openai/gpt-4o-mini`.
    pub model: String,
    /// API base URL without trailing slash.
    pub base_url: String,
    /// Public URL of this app, sent as `HTTP-Referer`.
    pub app_url: String,
}

/// Errors from the completion API layer.
#[derive(Debug, thiserror::Error)]
pub enum OpenRouterError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// OpenRouter answered with a non-2xx status.
    #[error("OpenRouter API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Upstream message, or [`FALLBACK_ERROR_MESSAGE`].
        message: String,
    },

    /// A 2xx response whose body is not a completion envelope.
    #[error("Malformed completion response: {0}")]
    MalformedEnvelope(String),
}

impl OpenRouterError {
    /// Message safe to show to the caller.
    pub fn client_message(&self) -> &str {
        match self {
            OpenRouterError::Api { message, .. } => message,
            OpenRouterError::Request(_) | OpenRouterError::MalformedEnvelope(_) => {
                FALLBACK_ERROR_MESSAGE
            }
        }
    }
}

/// HTTP client bound to one API key and model.
pub struct OpenRouterClient {
    client: reqwest::Client,
    config: OpenRouterConfig,
}

impl OpenRouterClient {
    /// Build a client with the generation timeout applied to every request.
    pub fn new(config: OpenRouterConfig) -> Result<Self, OpenRouterError> {
        let client = reqwest::Client::builder()
            .timeout(GENERATION_TIMEOUT)
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: OpenRouterConfig) -> Self {
        Self { client, config }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Turn a non-2xx response into [`OpenRouterError::Api`], reading the
    /// upstream message out of the body when there is one.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, OpenRouterError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|json| upstream_error_message(&json))
            .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string());

        Err(OpenRouterError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl CompletionClient for OpenRouterClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, OpenRouterError> {
        let body = ChatCompletionBody::new(&self.config.model, request);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .header("HTTP-Referer", &self.config.app_url)
            .header("X-Title", APP_TITLE)
            .json(&body)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let text = response.text().await?;
        let envelope: ChatCompletionResponse = serde_json::from_str(&text)
            .map_err(|e| OpenRouterError::MalformedEnvelope(e.to_string()))?;

        let reply = envelope.reply_text();
        tracing::debug!(
            model = %self.config.model,
            reply_len = reply.len(),
            "Completion received"
        );
        Ok(reply)
    }
}
