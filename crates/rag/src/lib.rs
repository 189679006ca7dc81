//! Retrieval for the design mentor
//!
//! Features:
//! - Embedding client over the shared inference HTTP client
//! - Passage store with bounded-concurrency batch embedding fill
//! - Exact Euclidean similarity search
//! - Per-user search history with context, suggestions and trending queries
//! - Contextual query expansion with domain synonyms and profile filters

pub mod embeddings;
pub mod passage_store;
pub mod query_expansion;
pub mod search;
pub mod search_history;

pub use embeddings::{EmbeddingClient, EmbeddingConfig};
pub use passage_store::{fill_missing_embeddings, FillConfig, FillReport, PassageStore};
pub use query_expansion::{ContextualQueryExpander, ExpandedQuery, ExpansionTerm, TermSource};
pub use search::{euclidean_distance, nearest, resolve_vectors, search, Match, ScoredPassage};
pub use search_history::{HistoryConfig, SearchHistory, UserSearchContext};

use design_mentor_llm::LlmError;
use thiserror::Error;

/// RAG errors
#[derive(Error, Debug)]
pub enum RagError {
    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Core(#[from] design_mentor_core::Error),
}

impl From<RagError> for design_mentor_core::Error {
    fn from(err: RagError) -> Self {
        use design_mentor_core::Error;
        match err {
            RagError::Embedding(msg) => {
                Error::UpstreamUnavailable(format!("malformed embedding response: {}", msg))
            }
            RagError::InvalidInput(msg) => Error::InvalidInput(msg),
            RagError::Llm(e) => e.into(),
            RagError::Core(e) => e,
        }
    }
}
