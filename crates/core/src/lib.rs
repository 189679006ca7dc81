//! Core traits and types for the design mentor
//!
//! This crate provides foundational types used across all other crates:
//! - Corpus passages and their embeddings
//! - User sessions, preferences and conversation history
//! - Search records and derived filters
//! - Expertise levels, command types and response styles
//! - JSON file persistence helpers
//! - Pluggable seams (`Embedder`, `SuggestionSource`)
//! - The shared error taxonomy

pub mod error;
pub mod passage;
pub mod profile;
pub mod search;
pub mod session;
pub mod storage;
pub mod traits;

pub use error::{Error, Result};
pub use passage::Passage;
pub use profile::{CommandType, ExpertiseLevel, ResponseStyle};
pub use search::{SearchFilters, SearchRecord};
pub use session::{
    HistoryEntry, Preferences, SessionAnalytics, UserSession, HISTORY_CAPACITY,
    MAX_MESSAGE_CHARS, PERSISTED_HISTORY,
};
pub use traits::{Embedder, SuggestionSource};
