//! Chat completion providers
//!
//! [`ChatProvider`] is the seam between narratives and the text-generation
//! service. [`OpenAiProvider`] talks to any OpenAI-compatible
//! `/chat/completions` endpoint.

use crate::error::{NarrativeError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// A single-prompt completion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub model: String,
    pub prompt: String,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Complete the prompt and return the assistant's text
    async fn complete(&self, request: ChatRequest) -> Result<String>;

    /// Provider name (e.g. "openai")
    fn name(&self) -> &str;
}

/// Configuration for [`OpenAiProvider`]
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,

    /// Base URL, e.g. "https://api.openai.com/v1" or a local compatible server
    pub api_base: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Read `OPENAI_API_KEY` and, if set, `OPENAI_API_BASE`
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            NarrativeError::ConfigurationError(
                "OPENAI_API_KEY environment variable not set".to_string(),
            )
        })?;

        let api_base = std::env::var("OPENAI_API_BASE")
            .unwrap_or_else(|_| DEFAULT_OPENAI_API_BASE.to_string());

        Ok(Self {
            api_key,
            api_base,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

/// OpenAI-compatible chat completions client
pub struct OpenAiProvider {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiProvider {
    pub fn with_config(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::with_config(OpenAiConfig::from_env()?)
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    #[instrument(skip(self, request), fields(model = %request.model, api_base = %self.config.api_base))]
    async fn complete(&self, request: ChatRequest) -> Result<String> {
        debug!("Sending completion request ({} prompt chars)", request.prompt.len());

        let body = OpenAiRequest::from(&request);
        let response = self
            .client
            .post(self.config.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(status_error(status.as_u16(), &request.model, error_text));
        }

        let response: OpenAiResponse = response.json().await.map_err(|e| {
            NarrativeError::UnexpectedResponse(format!("Failed to parse response: {e}"))
        })?;
        completion_text(response)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

fn status_error(status: u16, model: &str, error_text: String) -> NarrativeError {
    match status {
        401 => NarrativeError::AuthenticationFailed,
        429 => NarrativeError::RateLimitExceeded(error_text),
        400 => NarrativeError::InvalidRequest(error_text),
        404 => NarrativeError::ModelNotFound(model.to_string()),
        _ => NarrativeError::RequestFailed(format!("HTTP {status}: {error_text}")),
    }
}

fn completion_text(response: OpenAiResponse) -> Result<String> {
    let choice = response.choices.into_iter().next().ok_or_else(|| {
        NarrativeError::UnexpectedResponse("No choices in response".to_string())
    })?;

    if let Some(usage) = &response.usage {
        debug!(
            "Received completion - finish_reason: {}, tokens: {}/{}",
            choice.finish_reason.as_deref().unwrap_or("unknown"),
            usage.prompt_tokens,
            usage.completion_tokens
        );
    }

    let text = choice.message.content.unwrap_or_default().trim().to_string();
    if text.is_empty() {
        return Err(NarrativeError::UnexpectedResponse(
            "Empty completion content".to_string(),
        ));
    }
    Ok(text)
}

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
}

impl From<&ChatRequest> for OpenAiRequest {
    fn from(request: &ChatRequest) -> Self {
        Self {
            model: request.model.clone(),
            messages: vec![OpenAiMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
}
