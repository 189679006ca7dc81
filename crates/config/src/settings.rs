//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{endpoints, generation, http, models, retrieval};
use crate::ConfigError;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// HTTP surface
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream inference API
    #[serde(default)]
    pub api: ApiConfig,

    /// Shared HTTP client behaviour (pooling, retries)
    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub embedding: EmbeddingSettings,

    #[serde(default)]
    pub llm: LlmSettings,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// JSON file locations
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Optional YAML file overriding the built-in domain tables
    #[serde(default)]
    pub domain_config_path: Option<String>,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Enforce `cors_origins`; when false every origin is allowed
    #[serde(default = "default_true")]
    pub cors_enabled: bool,
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: true,
            cors_origins: Vec::new(),
        }
    }
}

/// Inference API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL; `/embeddings` and `/chat/completions` are appended
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token; falls back to the FIREWORKS_API_KEY environment variable
    #[serde(default = "default_api_key", skip_serializing)]
    pub api_key: Option<String>,
}

fn default_base_url() -> String {
    endpoints::INFERENCE_BASE_URL.to_string()
}

fn default_api_key() -> Option<String> {
    std::env::var(endpoints::API_KEY_ENV)
        .ok()
        .filter(|key| !key.trim().is_empty())
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: default_api_key(),
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Attempts per request, first try included
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Upper bound for any single wait, Retry-After included
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    #[serde(default = "default_pool_idle_per_host")]
    pub pool_idle_per_host: usize,
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

fn default_max_attempts() -> u32 {
    http::MAX_ATTEMPTS
}

fn default_initial_backoff_ms() -> u64 {
    http::INITIAL_BACKOFF_MS
}

fn default_max_backoff_ms() -> u64 {
    http::MAX_BACKOFF_MS
}

fn default_pool_idle_per_host() -> usize {
    http::POOL_IDLE_PER_HOST
}

fn default_max_in_flight() -> usize {
    http::MAX_IN_FLIGHT
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            pool_idle_per_host: default_pool_idle_per_host(),
            max_in_flight: default_max_in_flight(),
        }
    }
}

/// Embedding model and batch fill configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,
    /// Embedding calls in flight during batch fill
    #[serde(default = "default_fill_concurrency")]
    pub fill_concurrency: usize,
    /// Pause after each completed call during batch fill
    #[serde(default = "default_fill_pacing_ms")]
    pub fill_pacing_ms: u64,
}

fn default_embedding_model() -> String {
    models::EMBEDDING_MODEL.to_string()
}

fn default_dimensions() -> usize {
    models::EMBEDDING_DIMENSIONS
}

fn default_embedding_timeout() -> u64 {
    http::EMBEDDING_TIMEOUT_SECS
}

fn default_fill_concurrency() -> usize {
    retrieval::FILL_CONCURRENCY
}

fn default_fill_pacing_ms() -> u64 {
    retrieval::FILL_PACING_MS
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            dimensions: default_dimensions(),
            timeout_secs: default_embedding_timeout(),
            fill_concurrency: default_fill_concurrency(),
            fill_pacing_ms: default_fill_pacing_ms(),
        }
    }
}

/// Chat completion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "default_chat_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_chat_timeout")]
    pub timeout_secs: u64,
}

fn default_chat_model() -> String {
    models::CHAT_MODEL.to_string()
}

fn default_temperature() -> f32 {
    generation::TEMPERATURE
}

fn default_max_tokens() -> usize {
    generation::MAX_TOKENS
}

fn default_top_p() -> f32 {
    generation::TOP_P
}

fn default_chat_timeout() -> u64 {
    http::CHAT_TIMEOUT_SECS
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: default_chat_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
            timeout_secs: default_chat_timeout(),
        }
    }
}

/// Retrieval, suggestion and trending configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Passages retrieved per search
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Recent searches analysed for user context
    #[serde(default = "default_context_window")]
    pub context_window: usize,
    #[serde(default = "default_max_records")]
    pub max_records_per_user: usize,
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
    #[serde(default = "default_trending_window_days")]
    pub trending_window_days: i64,
    #[serde(default = "default_trending_limit")]
    pub trending_limit: usize,
}

fn default_top_k() -> usize {
    retrieval::TOP_K
}

fn default_context_window() -> usize {
    retrieval::CONTEXT_WINDOW
}

fn default_max_records() -> usize {
    retrieval::MAX_RECORDS_PER_USER
}

fn default_max_suggestions() -> usize {
    retrieval::MAX_SUGGESTIONS
}

fn default_trending_window_days() -> i64 {
    retrieval::TRENDING_WINDOW_DAYS
}

fn default_trending_limit() -> usize {
    retrieval::TRENDING_LIMIT
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            context_window: default_context_window(),
            max_records_per_user: default_max_records(),
            max_suggestions: default_max_suggestions(),
            trending_window_days: default_trending_window_days(),
            trending_limit: default_trending_limit(),
        }
    }
}

/// Durable storage locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_passages_file")]
    pub passages_file: String,
    #[serde(default = "default_sessions_file")]
    pub sessions_file: String,
    #[serde(default = "default_search_history_file")]
    pub search_history_file: String,
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_passages_file() -> String {
    "passages.json".to_string()
}

fn default_sessions_file() -> String {
    "user_sessions.json".to_string()
}

fn default_search_history_file() -> String {
    "search_history.json".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            passages_file: default_passages_file(),
            sessions_file: default_sessions_file(),
            search_history_file: default_search_history_file(),
        }
    }
}

impl StorageConfig {
    pub fn passages_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(&self.passages_file)
    }

    pub fn sessions_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(&self.sessions_file)
    }

    pub fn search_history_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(&self.search_history_file)
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_json: bool,
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

impl Settings {
    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_api()?;
        self.validate_http()?;
        self.validate_embedding()?;
        self.validate_llm()?;
        self.validate_retrieval()?;
        self.validate_observability()?;
        Ok(())
    }

    fn validate_api(&self) -> Result<(), ConfigError> {
        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "api.base_url".to_string(),
                message: format!("Must be an http(s) URL, got '{}'", url),
            });
        }
        Ok(())
    }

    fn validate_http(&self) -> Result<(), ConfigError> {
        let http = &self.http;

        if http.max_attempts == 0 || http.max_attempts > 10 {
            return Err(ConfigError::InvalidValue {
                field: "http.max_attempts".to_string(),
                message: format!("Must be between 1 and 10, got {}", http.max_attempts),
            });
        }

        if http.initial_backoff_ms > http.max_backoff_ms {
            return Err(ConfigError::InvalidValue {
                field: "http.initial_backoff_ms".to_string(),
                message: format!(
                    "Must not exceed http.max_backoff_ms ({}), got {}",
                    http.max_backoff_ms, http.initial_backoff_ms
                ),
            });
        }

        if http.max_in_flight == 0 {
            return Err(ConfigError::InvalidValue {
                field: "http.max_in_flight".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    fn validate_embedding(&self) -> Result<(), ConfigError> {
        let embedding = &self.embedding;

        if embedding.dimensions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "embedding.dimensions".to_string(),
                message: "Must be positive".to_string(),
            });
        }

        if embedding.fill_concurrency == 0 || embedding.fill_concurrency > 16 {
            return Err(ConfigError::InvalidValue {
                field: "embedding.fill_concurrency".to_string(),
                message: format!("Must be between 1 and 16, got {}", embedding.fill_concurrency),
            });
        }

        if embedding.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "embedding.timeout_secs".to_string(),
                message: "Must be positive".to_string(),
            });
        }

        Ok(())
    }

    fn validate_llm(&self) -> Result<(), ConfigError> {
        let llm = &self.llm;

        if !(0.0..=2.0).contains(&llm.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "llm.temperature".to_string(),
                message: format!("Must be between 0.0 and 2.0, got {}", llm.temperature),
            });
        }

        if !(0.0..=1.0).contains(&llm.top_p) || llm.top_p == 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "llm.top_p".to_string(),
                message: format!("Must be in (0.0, 1.0], got {}", llm.top_p),
            });
        }

        if llm.max_tokens == 0 {
            return Err(ConfigError::InvalidValue {
                field: "llm.max_tokens".to_string(),
                message: "Must be positive".to_string(),
            });
        }

        if llm.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "llm.timeout_secs".to_string(),
                message: "Must be positive".to_string(),
            });
        }

        Ok(())
    }

    fn validate_retrieval(&self) -> Result<(), ConfigError> {
        let retrieval = &self.retrieval;

        if retrieval.top_k == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retrieval.top_k".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if retrieval.max_records_per_user < retrieval.context_window {
            return Err(ConfigError::InvalidValue {
                field: "retrieval.max_records_per_user".to_string(),
                message: format!(
                    "Must be at least retrieval.context_window ({}), got {}",
                    retrieval.context_window, retrieval.max_records_per_user
                ),
            });
        }

        if retrieval.trending_window_days <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "retrieval.trending_window_days".to_string(),
                message: "Must be positive".to_string(),
            });
        }

        Ok(())
    }

    fn validate_observability(&self) -> Result<(), ConfigError> {
        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        let level = self.observability.log_level.to_lowercase();
        if !LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "observability.log_level".to_string(),
                message: format!("Must be one of {:?}, got '{}'", LEVELS, level),
            });
        }
        Ok(())
    }
}

/// Load settings from files and environment
///
/// Priority: env vars > config/{env}.yaml > config/default.yaml > defaults.
/// Environment variables use the `DESIGN_MENTOR` prefix and `__` as the
/// section separator, e.g. `DESIGN_MENTOR__LLM__TEMPERATURE=0.5`.
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("DESIGN_MENTOR")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.embedding.dimensions, 768);
        assert_eq!(settings.embedding.model, "nomic-ai/nomic-embed-text-v1.5");
        assert_eq!(settings.llm.max_tokens, 1500);
        assert!((settings.llm.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(settings.http.max_attempts, 3);
        assert_eq!(settings.embedding.fill_concurrency, 3);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_storage_paths() {
        let storage = StorageConfig::default();
        assert_eq!(
            storage.sessions_path(),
            PathBuf::from("data").join("user_sessions.json")
        );
        assert!(storage.passages_path().ends_with("passages.json"));
    }

    #[test]
    fn test_http_validation() {
        let mut settings = Settings::default();
        settings.http.max_attempts = 0;
        assert!(settings.validate_http().is_err());

        settings.http.max_attempts = 3;
        settings.http.initial_backoff_ms = 60_000;
        assert!(settings.validate_http().is_err());

        settings.http.initial_backoff_ms = 500;
        assert!(settings.validate_http().is_ok());
    }

    #[test]
    fn test_llm_validation() {
        let mut settings = Settings::default();
        settings.llm.temperature = 2.5;
        assert!(settings.validate_llm().is_err());

        settings.llm.temperature = 0.3;
        settings.llm.top_p = 0.0;
        assert!(settings.validate_llm().is_err());

        settings.llm.top_p = 0.9;
        assert!(settings.validate_llm().is_ok());
    }

    #[test]
    fn test_retrieval_validation() {
        let mut settings = Settings::default();
        settings.retrieval.top_k = 0;
        assert!(settings.validate_retrieval().is_err());

        settings.retrieval.top_k = 5;
        settings.retrieval.max_records_per_user = 10;
        let err = settings.validate_retrieval().unwrap_err();
        assert!(err.to_string().contains("retrieval.max_records_per_user"));
    }

    #[test]
    fn test_base_url_validation() {
        let mut settings = Settings::default();
        settings.api.base_url = "ftp://example.com".to_string();
        assert!(settings.validate_api().is_err());
    }

    #[test]
    fn test_log_level_validation() {
        let mut settings = Settings::default();
        settings.observability.log_level = "verbose".to_string();
        assert!(settings.validate().is_err());
        settings.observability.log_level = "DEBUG".to_string();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_api_key_not_serialized() {
        let mut settings = Settings::default();
        settings.api.api_key = Some("secret".to_string());
        let json = serde_json::to_string(&settings).unwrap();
        assert!(!json.contains("secret"));
    }
}
