//! Design assistant orchestration
//!
//! Features:
//! - Durable per-user sessions with onboarding preferences
//! - Adaptive prompt construction by expertise level, command type and profile
//! - Grounded and general answer generation over the chat backend
//! - Response personalization with tips and suggested searches
//! - Per-user in-flight guard rejecting concurrent requests

pub mod assistant;
pub mod generator;
pub mod guard;
pub mod personalizer;
pub mod prompt_builder;
pub mod session_store;

pub use assistant::{
    AskRequest, AssistantConfig, DesignAssistant, ProfileUpdate, SearchAnswer, SearchRequest,
    BUSY_MESSAGE,
};
pub use generator::{
    AnswerGenerator, GroundedAnswer, EMPTY_GENERATION_FALLBACK, NO_RELEVANT_RESOURCES,
};
pub use guard::{UserGuard, UserTicket};
pub use personalizer::{ResponsePersonalizer, MAX_TIPS};
pub use prompt_builder::{AdaptivePromptBuilder, LevelPreview};
pub use session_store::SessionStore;

use design_mentor_rag::RagError;
use thiserror::Error;

/// Agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    /// A request for this user is still being processed
    #[error("Already processing a request for user {user_id}")]
    Busy { user_id: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Rag(#[from] RagError),
}

impl From<AgentError> for design_mentor_core::Error {
    fn from(err: AgentError) -> Self {
        use design_mentor_core::Error;
        match err {
            AgentError::Busy { user_id } => Error::Busy(user_id),
            AgentError::InvalidInput(msg) => Error::InvalidInput(msg),
            AgentError::Rag(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_maps_to_core() {
        let err: design_mentor_core::Error = AgentError::Busy {
            user_id: "u1".to_string(),
        }
        .into();
        assert!(matches!(err, design_mentor_core::Error::Busy(ref u) if u == "u1"));
    }

    #[test]
    fn test_upstream_error_passes_through() {
        use design_mentor_llm::LlmError;

        let err: design_mentor_core::Error = AgentError::Rag(RagError::Llm(LlmError::Timeout)).into();
        assert!(err.is_upstream());
    }
}
