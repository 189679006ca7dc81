//! Configuration management for the design mentor
//!
//! Supports loading configuration from:
//! - YAML/TOML files (`config/default`, `config/{env}`)
//! - Environment variables (`DESIGN_MENTOR__` prefix)
//!
//! # Domain tables
//!
//! Synonyms, tool variations, prompt templates, tips and suggestions are
//! held in [`DomainTables`]. Built-in defaults cover the UX/UI domain and
//! `domain_config_path` can point at a YAML override.

pub mod constants;
pub mod domain;
pub mod settings;

pub use domain::{
    AdaptationConfig, CommandTemplates, DomainTables, InterestHint, LevelTable, NamedTerms,
    NamedText, PromptsConfig, StyleTable, SynonymEntry, VocabularyConfig,
};
pub use settings::{
    load_settings, ApiConfig, EmbeddingSettings, HttpConfig, LlmSettings, ObservabilityConfig,
    RetrievalConfig, ServerConfig, Settings, StorageConfig,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<ConfigError> for design_mentor_core::Error {
    fn from(err: ConfigError) -> Self {
        design_mentor_core::Error::Config(err.to_string())
    }
}
