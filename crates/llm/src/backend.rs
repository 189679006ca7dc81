//! Chat completion backends
//!
//! The generator talks to a [`ChatBackend`]; production uses
//! [`OpenAIBackend`] against any OpenAI-compatible `/chat/completions`
//! endpoint through the shared [`HttpClient`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use design_mentor_config::constants::{endpoints, generation, http, models};
use design_mentor_config::{ApiConfig, LlmSettings};

use crate::http::HttpClient;
use crate::prompt::Message;
use crate::LlmError;

/// Chat completion configuration
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// API base URL, without the `/chat/completions` suffix
    pub endpoint: String,
    /// Model name/ID
    pub model: String,
    /// Maximum tokens to generate
    pub max_tokens: usize,
    /// Temperature
    pub temperature: f32,
    /// Top-p sampling
    pub top_p: f32,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: endpoints::INFERENCE_BASE_URL.to_string(),
            model: models::CHAT_MODEL.to_string(),
            max_tokens: generation::MAX_TOKENS,
            temperature: generation::TEMPERATURE,
            top_p: generation::TOP_P,
            timeout: Duration::from_secs(http::CHAT_TIMEOUT_SECS),
        }
    }
}

impl ChatConfig {
    pub fn from_settings(api: &ApiConfig, llm: &LlmSettings) -> Self {
        Self {
            endpoint: api.base_url.clone(),
            model: llm.model.clone(),
            max_tokens: llm.max_tokens,
            temperature: llm.temperature,
            top_p: llm.top_p,
            timeout: Duration::from_secs(llm.timeout_secs),
        }
    }
}

/// Generation result
#[derive(Debug, Clone, Default)]
pub struct GenerationResult {
    /// Generated text; empty when the upstream returned no choices
    pub text: String,
    /// Tokens generated, when reported
    pub tokens: usize,
    /// Wall-clock time for the call (ms)
    pub total_time_ms: u64,
    /// Upstream finish reason, when reported
    pub finish_reason: Option<String>,
}

/// Chat completion backend
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Run one completion over the given messages
    async fn generate(&self, messages: &[Message]) -> Result<GenerationResult, LlmError>;

    /// Model name
    fn model_name(&self) -> &str;
}

/// OpenAI-compatible backend
pub struct OpenAIBackend {
    config: ChatConfig,
    http: HttpClient,
}

impl OpenAIBackend {
    pub fn new(config: ChatConfig, http: HttpClient) -> Self {
        Self { config, http }
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.config.endpoint.trim_end_matches('/'))
    }

    fn build_request<'a>(&'a self, messages: &'a [Message]) -> OpenAIChatRequest<'a> {
        OpenAIChatRequest {
            model: &self.config.model,
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
        }
    }
}

#[async_trait]
impl ChatBackend for OpenAIBackend {
    async fn generate(&self, messages: &[Message]) -> Result<GenerationResult, LlmError> {
        let start = Instant::now();
        let request = self.build_request(messages);

        let response: OpenAIChatResponse = self
            .http
            .post_json(&self.chat_url(), &request, self.config.timeout)
            .await?;

        let total_time_ms = start.elapsed().as_millis() as u64;
        let tokens = response.usage.map(|u| u.completion_tokens).unwrap_or(0);

        let (text, finish_reason) = match response.choices.into_iter().next() {
            Some(choice) => (
                choice.message.content.unwrap_or_default(),
                choice.finish_reason,
            ),
            None => {
                tracing::warn!(model = %self.config.model, "Completion returned no choices");
                (String::new(), None)
            }
        };

        tracing::debug!(
            model = %self.config.model,
            tokens,
            total_time_ms,
            "Chat completion finished"
        );

        Ok(GenerationResult {
            text,
            tokens,
            total_time_ms,
            finish_reason,
        })
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// OpenAI API types
#[derive(Debug, Serialize)]
struct OpenAIChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    max_tokens: usize,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Deserialize)]
struct OpenAIChatResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    completion_tokens: usize,
}
