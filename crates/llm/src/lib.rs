//! Inference API integration
//!
//! Features:
//! - Pooled HTTP client with bounded retry and `Retry-After` support
//! - OpenAI-compatible chat completion backend
//! - Chat message types

pub mod backend;
pub mod http;
pub mod prompt;

pub use backend::{ChatBackend, ChatConfig, GenerationResult, OpenAIBackend};
pub use http::{HttpClient, HttpClientConfig};
pub use prompt::{Message, Role};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout")]
    Timeout,

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Upstream unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else if err.is_decode() {
            LlmError::InvalidResponse(err.to_string())
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for design_mentor_core::Error {
    fn from(err: LlmError) -> Self {
        use design_mentor_core::Error;
        match err {
            LlmError::Timeout => Error::UpstreamTimeout("request timed out".to_string()),
            LlmError::Status { status, body } => Error::UpstreamHttp {
                status,
                message: body,
            },
            LlmError::Network(msg) | LlmError::Unavailable(msg) => Error::UpstreamUnavailable(msg),
            LlmError::InvalidResponse(msg) => {
                Error::UpstreamUnavailable(format!("invalid response: {}", msg))
            }
            LlmError::Configuration(msg) => Error::Config(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use design_mentor_core::Error;

    #[test]
    fn test_error_mapping() {
        assert!(matches!(Error::from(LlmError::Timeout), Error::UpstreamTimeout(_)));
        assert!(matches!(
            Error::from(LlmError::Status {
                status: 401,
                body: "unauthorized".into()
            }),
            Error::UpstreamHttp { status: 401, .. }
        ));
        assert!(matches!(
            Error::from(LlmError::Unavailable("down".into())),
            Error::UpstreamUnavailable(_)
        ));
    }
}
