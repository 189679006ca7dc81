//! Error taxonomy shared by every crate in the workspace
//!
//! Crate-local errors (`LlmError`, `RagError`, `AgentError`, `ConfigError`)
//! convert into this type at crate boundaries.

use thiserror::Error;

/// Workspace-wide error
#[derive(Error, Debug)]
pub enum Error {
    /// The upstream request did not complete before its deadline
    #[error("Upstream timeout: {0}")]
    UpstreamTimeout(String),

    /// Connection or transient HTTP failure after all retries were spent
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Non-retryable non-2xx response
    #[error("Upstream HTTP error {status}: {message}")]
    UpstreamHttp { status: u16, message: String },

    /// The completion endpoint answered without usable content
    #[error("Empty generation result")]
    EmptyGenerationResult,

    /// Retrieval produced nothing to ground an answer on
    #[error("No relevant passages")]
    NoRelevantPassages,

    /// Durable write failed; the in-memory state is still authoritative
    #[error("Persistence write failure: {0}")]
    PersistenceWriteFailure(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A request for this user is already in flight
    #[error("Already processing a request for user {0}")]
    Busy(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether the failure came from a remote service rather than local state
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Error::UpstreamTimeout(_) | Error::UpstreamUnavailable(_) | Error::UpstreamHttp { .. }
        )
    }
}

/// Result alias used across the workspace
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_classification() {
        assert!(Error::UpstreamTimeout("embeddings".into()).is_upstream());
        assert!(Error::UpstreamHttp {
            status: 400,
            message: "bad request".into()
        }
        .is_upstream());
        assert!(!Error::NoRelevantPassages.is_upstream());
        assert!(!Error::Busy("42".into()).is_upstream());
    }

    #[test]
    fn test_display_carries_status() {
        let err = Error::UpstreamHttp {
            status: 503,
            message: "overloaded".into(),
        };
        assert_eq!(err.to_string(), "Upstream HTTP error 503: overloaded");
    }
}
