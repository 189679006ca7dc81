//! Design assistant
//!
//! Entry point for callers. Owns the stores and composes the per-request
//! flows:
//! - `ask`: general answer adapted to the profile, no retrieval
//! - `search`: query expansion, retrieval over the passage store, grounded answer
//!
//! Both flows run under the per-user guard and always return displayable
//! content; the only errors are `Busy` and `InvalidInput`.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use chrono::Utc;
use design_mentor_config::{DomainTables, Settings};
use design_mentor_core::{
    Embedder, ExpertiseLevel, Passage, ResponseStyle, SearchFilters, SessionAnalytics,
    SuggestionSource, UserSession,
};
use design_mentor_llm::ChatBackend;
use design_mentor_rag::{ContextualQueryExpander, FillConfig, FillReport, PassageStore, SearchHistory};

use crate::generator::{AnswerGenerator, GroundedAnswer};
use crate::guard::UserGuard;
use crate::personalizer::ResponsePersonalizer;
use crate::prompt_builder::{AdaptivePromptBuilder, LevelPreview};
use crate::session_store::SessionStore;
use crate::AgentError;

/// Shown to a user whose previous request is still running
pub const BUSY_MESSAGE: &str = "⏳ Already processing your previous query. Please wait...";

const NO_DOCUMENTS: &str = "⚠️ No processed documents are available for search.";
const EMBEDDING_FAILED: &str = "❌ I could not process your query. Try another question.";
const NO_MATCHES: &str = "❓ I did not find documents related to your query.";

/// Command label used to build prompts for search answers
const SEARCH_COMMAND: &str = "search";

/// Question for the general answer flow
#[derive(Debug, Clone, Deserialize)]
pub struct AskRequest {
    pub user_id: String,
    pub question: String,
    /// design, ux, ui or tools; anything else uses the design templates
    #[serde(default = "default_command")]
    pub command_type: String,
}

fn default_command() -> String {
    "design".to_string()
}

/// Query for the retrieval flow
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub user_id: String,
    pub query: String,
    #[serde(default)]
    pub filters: SearchFilters,
}

/// Grounded answer plus the query actually embedded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchAnswer {
    pub answer: String,
    pub references: Vec<String>,
    pub expanded_query: String,
}

/// Onboarding and preference edits, applied together
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileUpdate {
    pub expertise_level: Option<String>,
    pub response_style: Option<String>,
    /// Each tool is added if absent, removed otherwise
    pub toggle_tools: Vec<String>,
    /// Each interest is added if absent, removed otherwise
    pub toggle_interests: Vec<String>,
    pub onboarding_completed: Option<bool>,
}

/// Tunables for the assistant flows
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// Passages retrieved per search
    pub top_k: usize,
    pub fill: FillConfig,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            top_k: design_mentor_config::constants::retrieval::TOP_K,
            fill: FillConfig::default(),
        }
    }
}

impl AssistantConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            top_k: settings.retrieval.top_k,
            fill: FillConfig::from_settings(&settings.embedding),
        }
    }
}

/// The conversational design assistant
pub struct DesignAssistant {
    sessions: Arc<SessionStore>,
    passages: Arc<PassageStore>,
    history: Arc<SearchHistory>,
    embedder: Arc<dyn Embedder>,
    expander: ContextualQueryExpander,
    builder: AdaptivePromptBuilder,
    generator: AnswerGenerator,
    personalizer: ResponsePersonalizer,
    guard: UserGuard,
    config: AssistantConfig,
}

impl DesignAssistant {
    pub fn new(
        tables: Arc<DomainTables>,
        sessions: Arc<SessionStore>,
        passages: Arc<PassageStore>,
        history: Arc<SearchHistory>,
        embedder: Arc<dyn Embedder>,
        backend: Arc<dyn ChatBackend>,
        config: AssistantConfig,
    ) -> Self {
        let suggestions: Arc<dyn SuggestionSource> = history.clone();
        Self {
            expander: ContextualQueryExpander::new(tables.clone(), history.clone()),
            builder: AdaptivePromptBuilder::new(tables.clone()),
            generator: AnswerGenerator::new(backend, tables.clone()),
            personalizer: ResponsePersonalizer::new(tables).with_suggestions(suggestions),
            guard: UserGuard::new(),
            sessions,
            passages,
            history,
            embedder,
            config,
        }
    }

    /// Answer a question from general design knowledge
    pub async fn ask(&self, request: &AskRequest) -> Result<GroundedAnswer, AgentError> {
        let user_id = require("user_id", &request.user_id)?;
        let question = require("question", &request.question)?;
        let _ticket = self.guard.try_acquire(user_id)?;

        tracing::info!(user_id, command = %request.command_type, "Answering question");

        self.sessions
            .update_context(user_id, &format!("question_{}", request.command_type));
        let session = self.sessions.append_history(user_id, question);

        let prompt = self
            .builder
            .build(question, &request.command_type, &session, None);
        let answer = self.generator.generate_general(&prompt).await;

        Ok(GroundedAnswer {
            answer: self.personalizer.personalize(&answer, &session),
            references: Vec::new(),
        })
    }

    /// Answer a query from the passages closest to its expanded form
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchAnswer, AgentError> {
        let user_id = require("user_id", &request.user_id)?;
        let query = require("query", &request.query)?;
        let _ticket = self.guard.try_acquire(user_id)?;

        self.sessions.update_context(user_id, SEARCH_COMMAND);
        let session = self.sessions.record_search(user_id, query);

        let expanded = self
            .expander
            .expand(query, &session, request.filters.clone());
        let reply = |answer: &str| SearchAnswer {
            answer: answer.to_string(),
            references: Vec::new(),
            expanded_query: expanded.expanded.clone(),
        };

        if self.passages.embedded_count() == 0 {
            tracing::warn!(user_id, "Search requested with no embedded passages");
            return Ok(reply(NO_DOCUMENTS));
        }

        let vector = match self.embedder.embed(&expanded.expanded).await {
            Ok(vector) => vector,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Could not embed search query");
                return Ok(reply(EMBEDDING_FAILED));
            }
        };

        let hits: Vec<Passage> = self
            .passages
            .search(&vector, self.config.top_k)
            .into_iter()
            .map(|hit| hit.passage)
            .collect();
        tracing::info!(
            user_id,
            expanded = %expanded.expanded,
            hits = hits.len(),
            "Retrieved passages"
        );
        if hits.is_empty() {
            return Ok(reply(NO_MATCHES));
        }

        let prompt = self
            .builder
            .build(query, SEARCH_COMMAND, &session, Some(&hits));
        let grounded = self.generator.generate_grounded(&prompt, &hits).await;

        Ok(SearchAnswer {
            answer: self.personalizer.personalize(&grounded.answer, &session),
            references: grounded.references,
            expanded_query: expanded.expanded,
        })
    }

    pub fn session(&self, user_id: &str) -> UserSession {
        self.sessions.get_or_create(user_id)
    }

    pub fn analytics(&self, user_id: &str) -> SessionAnalytics {
        self.sessions.get_analytics(user_id)
    }

    pub fn tips(&self, user_id: &str) -> Vec<String> {
        self.personalizer.tips(&self.sessions.get_or_create(user_id))
    }

    pub fn suggestions(&self, user_id: &str, partial: &str) -> Vec<String> {
        let session = self.sessions.get_or_create(user_id);
        self.history.suggestions_for(&session, partial)
    }

    pub fn trending(&self) -> Vec<String> {
        self.history.trending(Utc::now())
    }

    pub fn preview(&self, question: &str, command: &str, user_id: &str) -> Vec<LevelPreview> {
        let session = self.sessions.get_or_create(user_id);
        self.builder.preview(question, command, &session)
    }

    /// Apply a profile edit; nothing is changed if any field is invalid
    pub fn update_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<UserSession, AgentError> {
        let user_id = require("user_id", user_id)?;
        let level = update
            .expertise_level
            .as_deref()
            .map(|label| {
                ExpertiseLevel::parse(label).ok_or_else(|| {
                    AgentError::InvalidInput(format!("unknown expertise level '{}'", label))
                })
            })
            .transpose()?;
        let style = update
            .response_style
            .as_deref()
            .map(|name| {
                ResponseStyle::parse(name).ok_or_else(|| {
                    AgentError::InvalidInput(format!("unknown response style '{}'", name))
                })
            })
            .transpose()?;

        let session = self.sessions.mutate(user_id, |s| {
            if let Some(level) = level {
                s.set_expertise_level(level);
            }
            if let Some(style) = style {
                s.preferences.response_style = style.as_str().to_string();
            }
            for tool in &update.toggle_tools {
                s.toggle_favorite_tool(tool);
            }
            for interest in &update.toggle_interests {
                s.toggle_interest(interest);
            }
            if let Some(done) = update.onboarding_completed {
                s.preferences.onboarding_completed = done;
            }
        });
        tracing::info!(user_id, level = %session.expertise_level, "Updated profile");
        Ok(session)
    }

    /// Embed every passage that still lacks a vector, then save the store
    pub async fn fill_embeddings(&self) -> Result<FillReport, AgentError> {
        let report = self
            .passages
            .fill(self.embedder.as_ref(), &self.config.fill)
            .await?;
        Ok(report)
    }

    pub fn is_processing(&self, user_id: &str) -> bool {
        self.guard.is_active(user_id)
    }

    pub fn passage_count(&self) -> usize {
        self.passages.len()
    }

    /// Write sessions and search history to disk
    pub fn flush(&self) {
        self.sessions.flush();
        self.history.flush();
    }
}

fn require<'a>(field: &str, value: &'a str) -> Result<&'a str, AgentError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AgentError::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(trimmed)
}
