//! Application State
//!
//! Shared state across all handlers. Built once at startup from settings.

use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

use design_mentor_agent::{AssistantConfig, DesignAssistant, SessionStore};
use design_mentor_config::{DomainTables, Settings};
use design_mentor_llm::{ChatConfig, HttpClient, HttpClientConfig, OpenAIBackend};
use design_mentor_rag::{EmbeddingClient, EmbeddingConfig, HistoryConfig, PassageStore, SearchHistory};

use crate::ServerError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub assistant: Arc<DesignAssistant>,
    /// Present when the Prometheus recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: Settings, assistant: Arc<DesignAssistant>) -> Self {
        Self {
            config: Arc::new(config),
            assistant,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }

    /// Wire the assistant from settings: domain tables, upstream clients and stores
    pub fn from_settings(config: Settings) -> Result<Self, ServerError> {
        let tables = Arc::new(
            DomainTables::from_optional_path(config.domain_config_path.as_deref())
                .map_err(|e| ServerError::Config(e.to_string()))?,
        );

        if config.api.api_key.is_none() {
            tracing::warn!("No inference API key configured; upstream calls will be rejected");
        }
        let http = HttpClient::new(HttpClientConfig::from_settings(&config.api, &config.http))
            .map_err(|e| ServerError::Config(e.to_string()))?;

        let embedder = Arc::new(EmbeddingClient::new(
            EmbeddingConfig::from_settings(&config.api, &config.embedding),
            http.clone(),
        ));
        let backend = Arc::new(OpenAIBackend::new(
            ChatConfig::from_settings(&config.api, &config.llm),
            http,
        ));

        let storage = &config.storage;
        let passages = Arc::new(
            PassageStore::load(storage.passages_path())
                .map_err(|e| ServerError::Internal(e.to_string()))?,
        );
        let sessions = Arc::new(SessionStore::open(storage.sessions_path()));
        let history = Arc::new(SearchHistory::open(
            storage.search_history_path(),
            HistoryConfig::from_settings(&config.retrieval),
            tables.clone(),
        ));

        let assistant = DesignAssistant::new(
            tables,
            sessions,
            passages,
            history,
            embedder,
            backend,
            AssistantConfig::from_settings(&config),
        );

        tracing::info!(
            model = %config.llm.model,
            embedding_model = %config.embedding.model,
            passages = assistant.passage_count(),
            "Initialized design assistant"
        );

        Ok(Self::new(config, Arc::new(assistant)))
    }
}
