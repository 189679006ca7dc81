//! Pluggable seams between crates
//!
//! Components depend on these traits instead of concrete HTTP clients or
//! stores, so fakes can stand in for them in tests.

use async_trait::async_trait;

use crate::error::Result;
use crate::session::UserSession;

/// Text to fixed-dimension vector
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a non-empty text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Dimensionality of produced vectors
    fn dimensions(&self) -> usize;
}

/// Source of follow-up search suggestions for a user
pub trait SuggestionSource: Send + Sync {
    /// Suggestions matching `partial` (empty matches everything)
    fn suggestions(&self, session: &UserSession, partial: &str) -> Vec<String>;
}
