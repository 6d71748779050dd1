//! LLM Client: the single point of entry for chat-completion calls.
//!
//! ARCHITECTURAL RULE: No other module may call the provider directly.
//! All LLM interactions go through `ChatProvider`, implemented here by `LlmClient`
//! against any OpenAI-compatible `/chat/completions` API (OpenRouter by default).
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed completion envelope: {0}")]
    Envelope(#[from] serde_json::Error),
}

/// Anything that can answer a system + user exchange with a single JSON object.
///
/// `Ok(None)` means the provider answered but produced no content.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn complete_json(&self, system: &str, user: &str) -> Result<Option<String>, LlmError>;
}

/// Connection settings for `LlmClient`.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
    pub referer: String,
    pub title: String,
}

impl From<&Config> for LlmSettings {
    fn from(config: &Config) -> Self {
        Self {
            base_url: config.llm_base_url.clone(),
            api_key: config.openrouter_api_key.clone(),
            model: config.llm_model.clone(),
            timeout: Duration::from_secs(config.llm_timeout_secs),
            max_retries: config.llm_max_retries,
            retry_backoff: Duration::from_millis(config.llm_retry_backoff_ms),
            referer: config.app_referer.clone(),
            title: config.app_title.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatCompletion {
    /// Content of the first choice, if any non-empty content was returned.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_deref())
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// Chat-completions client with timeout, optional retry and JSON-mode requests.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    settings: LlmSettings,
}

impl LlmClient {
    pub fn new(settings: LlmSettings) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { client, settings })
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Makes a raw call to the provider, returning the full completion object.
    /// Retries transport errors, 429 and 5xx with exponential backoff, at most
    /// `max_retries` times; the last error is returned once retries run out.
    pub async fn call(&self, system: &str, user: &str) -> Result<ChatCompletion, LlmError> {
        let request_body = ChatCompletionRequest {
            model: &self.settings.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };
        let url = format!("{}/chat/completions", self.settings.base_url);
        let mut attempt: u32 = 0;

        loop {
            match self.attempt(&url, &request_body).await {
                Attempt::Done(result) => return result,
                Attempt::Retryable(err) if attempt >= self.settings.max_retries => return Err(err),
                Attempt::Retryable(err) => {
                    attempt += 1;
                    let delay = backoff_delay(self.settings.retry_backoff, attempt);
                    warn!(
                        "LLM call attempt {} failed ({}), retrying after {}ms...",
                        attempt,
                        err,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn attempt(&self, url: &str, request_body: &ChatCompletionRequest<'_>) -> Attempt {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.settings.api_key)
            .header("HTTP-Referer", &self.settings.referer)
            .header("X-Title", &self.settings.title)
            .json(request_body)
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => return Attempt::Retryable(LlmError::Http(e)),
        };

        let status = response.status();

        if status.as_u16() == 429 || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            warn!("LLM API returned {}: {}", status, body);
            return Attempt::Retryable(LlmError::Api {
                status: status.as_u16(),
                message: provider_message(body),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Attempt::Done(Err(LlmError::Api {
                status: status.as_u16(),
                message: provider_message(body),
            }));
        }

        Attempt::Done(parse_completion(response).await)
    }
}

/// Outcome of a single HTTP round trip.
enum Attempt {
    Done(Result<ChatCompletion, LlmError>),
    Retryable(LlmError),
}

async fn parse_completion(response: reqwest::Response) -> Result<ChatCompletion, LlmError> {
    let body = response.text().await?;
    let completion: ChatCompletion = serde_json::from_str(&body)?;

    if let Some(usage) = &completion.usage {
        debug!(
            "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
            usage.prompt_tokens, usage.completion_tokens
        );
    }

    Ok(completion)
}

#[async_trait]
impl ChatProvider for LlmClient {
    async fn complete_json(&self, system: &str, user: &str) -> Result<Option<String>, LlmError> {
        let completion = self.call(system, user).await?;
        Ok(completion.text().map(str::to_owned))
    }
}

fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 1u32 << (attempt - 1).min(10);
    base.saturating_mul(factor)
}

/// Pulls `error.message` out of an OpenAI-style error body, or returns the raw body.
fn provider_message(body: String) -> String {
    serde_json::from_str::<ProviderError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start()),
        None => text,
    }
}
