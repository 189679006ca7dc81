//! Embedding client
//!
//! Calls an OpenAI-compatible `/embeddings` endpoint through the shared
//! [`HttpClient`], so pooling, the in-flight limit and retry apply here too.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use design_mentor_config::constants::{endpoints, http, models};
use design_mentor_config::{ApiConfig, EmbeddingSettings};
use design_mentor_core::Embedder;
use design_mentor_llm::HttpClient;

use crate::RagError;

/// Embedding configuration
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    /// API base URL, without the `/embeddings` suffix
    pub endpoint: String,
    /// Model name
    pub model: String,
    /// Expected vector length
    pub dimensions: usize,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: endpoints::INFERENCE_BASE_URL.to_string(),
            model: models::EMBEDDING_MODEL.to_string(),
            dimensions: models::EMBEDDING_DIMENSIONS,
            timeout: Duration::from_secs(http::EMBEDDING_TIMEOUT_SECS),
        }
    }
}

impl EmbeddingConfig {
    pub fn from_settings(api: &ApiConfig, embedding: &EmbeddingSettings) -> Self {
        Self {
            endpoint: api.base_url.clone(),
            model: embedding.model.clone(),
            dimensions: embedding.dimensions,
            timeout: Duration::from_secs(embedding.timeout_secs),
        }
    }
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    input: &'a str,
    model: &'a str,
    dimensions: usize,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    data: Vec<EmbedItem>,
}

#[derive(Debug, Deserialize)]
struct EmbedItem {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

/// Remote embedder
pub struct EmbeddingClient {
    http: HttpClient,
    config: EmbeddingConfig,
}

impl EmbeddingClient {
    pub fn new(config: EmbeddingConfig, http: HttpClient) -> Self {
        Self { http, config }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn embeddings_url(&self) -> String {
        format!("{}/embeddings", self.config.endpoint.trim_end_matches('/'))
    }

    /// Embed a single non-empty text
    pub async fn embed_text(&self, text: &str) -> Result<Vec<f32>, RagError> {
        if text.trim().is_empty() {
            return Err(RagError::InvalidInput(
                "cannot embed empty text".to_string(),
            ));
        }

        let request = EmbedRequest {
            input: text,
            model: &self.config.model,
            dimensions: self.config.dimensions,
        };

        let response: EmbedResponse = self
            .http
            .post_json(&self.embeddings_url(), &request, self.config.timeout)
            .await?;

        first_vector(response, self.config.dimensions)
    }
}

/// Lowest-index vector of the response, checked against the expected dimension
fn first_vector(response: EmbedResponse, dimensions: usize) -> Result<Vec<f32>, RagError> {
    let mut data = response.data;
    data.sort_by_key(|item| item.index);

    let vector = data
        .into_iter()
        .next()
        .map(|item| item.embedding)
        .ok_or_else(|| RagError::Embedding("no embedding returned".to_string()))?;

    if vector.len() != dimensions {
        return Err(RagError::Embedding(format!(
            "expected {} dimensions, got {}",
            dimensions,
            vector.len()
        )));
    }

    Ok(vector)
}

#[async_trait]
impl Embedder for EmbeddingClient {
    async fn embed(&self, text: &str) -> design_mentor_core::Result<Vec<f32>> {
        self.embed_text(text).await.map_err(Into::into)
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }
}
