//! Centralized defaults
//!
//! Single source for endpoint, model and limit defaults used by the settings
//! module and by component configs that can be built without settings.

/// Upstream API endpoints
pub mod endpoints {
    /// OpenAI-compatible inference API (embeddings + chat completions)
    pub const INFERENCE_BASE_URL: &str = "https://api.fireworks.ai/inference/v1";

    /// Environment variable consulted when no API key is configured
    pub const API_KEY_ENV: &str = "FIREWORKS_API_KEY";
}

/// Model identifiers
pub mod models {
    pub const EMBEDDING_MODEL: &str = "nomic-ai/nomic-embed-text-v1.5";
    pub const EMBEDDING_DIMENSIONS: usize = 768;
    pub const CHAT_MODEL: &str = "accounts/fireworks/models/llama-v3p3-70b-instruct";
}

/// HTTP transport
pub mod http {
    /// Total attempts per request, first try included
    pub const MAX_ATTEMPTS: u32 = 3;
    pub const INITIAL_BACKOFF_MS: u64 = 1000;
    pub const MAX_BACKOFF_MS: u64 = 30_000;
    /// Idle connections kept warm per host
    pub const POOL_IDLE_PER_HOST: usize = 10;
    /// Requests allowed in flight at once
    pub const MAX_IN_FLIGHT: usize = 20;
    pub const EMBEDDING_TIMEOUT_SECS: u64 = 30;
    pub const CHAT_TIMEOUT_SECS: u64 = 45;
}

/// Generation parameters
pub mod generation {
    pub const TEMPERATURE: f32 = 0.3;
    pub const MAX_TOKENS: usize = 1500;
    pub const TOP_P: f32 = 0.9;
}

/// Retrieval and batch embedding
pub mod retrieval {
    pub const TOP_K: usize = 5;
    pub const FILL_CONCURRENCY: usize = 3;
    pub const FILL_PACING_MS: u64 = 100;
    /// Recent searches analysed for user context
    pub const CONTEXT_WINDOW: usize = 20;
    /// Stored searches per user
    pub const MAX_RECORDS_PER_USER: usize = 100;
    pub const MAX_SUGGESTIONS: usize = 8;
    pub const TRENDING_WINDOW_DAYS: i64 = 7;
    pub const TRENDING_LIMIT: usize = 10;
}
