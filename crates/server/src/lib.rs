//! Design Mentor Server
//!
//! Thin HTTP surface over the design assistant, plus health and
//! Prometheus metrics endpoints.

pub mod http;
pub mod metrics;
pub mod state;

pub use http::create_router;
pub use metrics::{init_metrics, record_request};
pub use state::AppState;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use design_mentor_agent::{AgentError, BUSY_MESSAGE};
use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Busy(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ServerError> for StatusCode {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Busy(_) => StatusCode::TOO_MANY_REQUESTS,
            ServerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AgentError> for ServerError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Busy { .. } => ServerError::Busy(BUSY_MESSAGE.to_string()),
            AgentError::InvalidInput(msg) => ServerError::InvalidRequest(msg),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl From<design_mentor_core::Error> for ServerError {
    fn from(err: design_mentor_core::Error) -> Self {
        match err {
            design_mentor_core::Error::Config(msg) => ServerError::Config(msg),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let status: StatusCode = self.into();
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_error_status() {
        let busy: ServerError = AgentError::Busy {
            user_id: "u1".to_string(),
        }
        .into();
        assert_eq!(busy.to_string(), BUSY_MESSAGE);
        assert_eq!(StatusCode::from(busy), StatusCode::TOO_MANY_REQUESTS);

        let invalid: ServerError = AgentError::InvalidInput("empty".to_string()).into();
        assert_eq!(StatusCode::from(invalid), StatusCode::BAD_REQUEST);
    }
}
