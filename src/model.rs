//! Model backend — OpenAI-compatible chat completions
//!
//! `CompletionBackend` is the seam between the conversation engine and the
//! third-party model API; tests swap in a mock, production uses
//! [`ChatCompletionClient`] against any OpenAI-compatible endpoint.
//!
//! The HTTP client enforces a per-request timeout and retries failed calls
//! with exponential backoff plus jitter. When the retry budget is exhausted
//! it surfaces [`Error::ModelExhausted`]; the engine converts that into a
//! safe fallback response.

use crate::config::ModelConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Role of a prompt message on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptRole {
    /// Instructions and injected memory context
    System,
    /// End-user message
    User,
    /// Prior model reply
    Assistant,
}

/// One message in a completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptMessage {
    /// Message role
    pub role: PromptRole,
    /// Message text
    pub content: String,
}

impl PromptMessage {
    /// Convenience constructor.
    pub fn new(role: PromptRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Abstract completion backend.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Produce a single assistant completion for the given messages.
    async fn complete(&self, messages: &[PromptMessage]) -> Result<String>;
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// HTTP client for OpenAI-compatible chat-completions endpoints.
pub struct ChatCompletionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    max_retries: u32,
}

impl ChatCompletionClient {
    /// Build a client from model configuration and a resolved API key.
    pub fn new(config: &ModelConfig, api_key: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            max_retries: config.max_retries,
        })
    }

    async fn request_once(&self, messages: &[PromptMessage]) -> Result<String> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Model(format!(
                "upstream returned {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let completion: ChatCompletionResponse = response.json().await?;

        if let Some(usage) = &completion.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "Model usage"
            );
        }

        extract_content(completion)
    }
}

#[async_trait]
impl CompletionBackend for ChatCompletionClient {
    async fn complete(&self, messages: &[PromptMessage]) -> Result<String> {
        let attempts = self.max_retries + 1;
        let mut last_error = String::new();

        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = backoff_delay(attempt);
                tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "Retrying model call");
                tokio::time::sleep(delay).await;
            }

            tracing::debug!(
                model = %self.model,
                message_count = messages.len(),
                attempt,
                "Model request"
            );

            match self.request_once(messages).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    tracing::warn!(attempt, "Model call failed: {}", e);
                    last_error = e.to_string();
                }
            }
        }

        Err(Error::ModelExhausted {
            attempts,
            last_error,
        })
    }
}

/// Pull the assistant text out of a parsed completion.
fn extract_content(completion: ChatCompletionResponse) -> Result<String> {
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or_else(|| Error::Model("completion had no content".to_string()))
}

/// Exponential backoff with jitter: 500ms * 2^(attempt-1), plus 0-250ms.
fn backoff_delay(attempt: u32) -> Duration {
    let base = Duration::from_millis(500) * 2u32.saturating_pow(attempt.saturating_sub(1));
    let jitter = Duration::from_millis(rand::thread_rng().gen_range(0..250));
    base + jitter
}
