//! Chat-completion client for fortune generation.
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint. Every error
//! variant is recoverable by the caller: the fortune pipeline answers with a
//! locally synthesized fallback instead of surfacing these.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::LlmConfig;

/// Errors from the fortune backend.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Fortune backend not configured")]
    NotConfigured,

    #[error("Request timeout after {0}s")]
    Timeout(u64),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned status {status}: {body}")]
    BadStatus { status: u16, body: String },

    #[error("Invalid response from backend: {0}")]
    InvalidResponse(String),
}

/// A text-generation backend.
///
/// Trait seam so the fortune service can be unit-tested without a network.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Sends one user prompt and returns the generated text, trimmed.
    async fn chat(&self, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// reqwest-backed [`LlmClient`].
pub struct HttpLlmClient {
    config: LlmConfig,
    client: Client,
}

impl HttpLlmClient {
    pub fn new(config: LlmConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self { config, client }
    }

    /// Full chat-completions URL for a configured base URL.
    ///
    /// Provider bases come in several shapes (`…/api/v3`, `…/v1`, bare
    /// hosts); normalize so the versioned segment is never doubled.
    fn completions_url(base: &str) -> String {
        let base = base.trim_end_matches('/');
        if base.ends_with("/v3") || base.contains("/v1") {
            format!("{}/chat/completions", base)
        } else {
            format!("{}/v1/chat/completions", base)
        }
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn chat(&self, prompt: &str) -> Result<String, LlmError> {
        if !self.config.is_configured() {
            return Err(LlmError::NotConfigured);
        }

        let url = Self::completions_url(&self.config.url);
        debug!(url = %url, model = %self.config.model, "Calling fortune backend");

        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(self.config.timeout_secs)
                } else {
                    LlmError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::BadStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("No choices in response".into()))?;

        Ok(content.trim().to_string())
    }
}
