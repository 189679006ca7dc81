//! Contextual query expansion
//!
//! Expands a raw query with:
//! - domain synonyms (up to two per matching token)
//! - the user's frequent search terms not already in the query
//! - context terms of favorite tools when the query talks about components,
//!   prototypes, animation or interaction
//!
//! and derives profile-based filters for any filter the caller left unset.
//! All vocabulary comes from [`DomainTables`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use design_mentor_config::DomainTables;
use design_mentor_core::{SearchFilters, UserSession};

use crate::search_history::{SearchHistory, UserSearchContext};

const SYNONYMS_PER_TOKEN: usize = 2;
const HISTORY_TERMS: usize = 2;

/// Where an expansion term came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TermSource {
    Original,
    Synonym,
    History,
    Tool,
}

/// A term of the expanded query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpansionTerm {
    pub term: String,
    pub source: TermSource,
}

impl ExpansionTerm {
    fn new(term: impl Into<String>, source: TermSource) -> Self {
        Self {
            term: term.into(),
            source,
        }
    }
}

/// Expanded query result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpandedQuery {
    /// Query as typed
    pub original: String,
    /// Space-joined expanded query
    pub expanded: String,
    /// Expanded terms in order
    pub terms: Vec<ExpansionTerm>,
    /// Caller filters plus derived preferences
    pub filters: SearchFilters,
}

impl ExpandedQuery {
    /// Whether anything beyond the original tokens was added
    pub fn was_expanded(&self) -> bool {
        self.terms.iter().any(|t| t.source != TermSource::Original)
    }
}

/// Query expander backed by the search history
pub struct ContextualQueryExpander {
    tables: Arc<DomainTables>,
    history: Arc<SearchHistory>,
}

impl ContextualQueryExpander {
    pub fn new(tables: Arc<DomainTables>, history: Arc<SearchHistory>) -> Self {
        Self { tables, history }
    }

    /// Expand a query for a user and record the search
    pub fn expand(&self, raw_query: &str, session: &UserSession, filters: SearchFilters) -> ExpandedQuery {
        self.expand_at(raw_query, session, filters, Utc::now())
    }

    /// Same as [`expand`](Self::expand) with an explicit record timestamp
    pub fn expand_at(
        &self,
        raw_query: &str,
        session: &UserSession,
        filters: SearchFilters,
        at: DateTime<Utc>,
    ) -> ExpandedQuery {
        let context = self.history.user_context(&session.user_id);
        let filters = self.expand_filters(filters, session);
        let terms = self.expand_terms(raw_query, &context, session);
        let expanded = terms
            .iter()
            .map(|t| t.term.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        tracing::debug!(
            user_id = %session.user_id,
            original = raw_query,
            expanded = %expanded,
            "Expanded query"
        );

        self.history.record(&session.user_id, raw_query, filters.clone(), at);

        ExpandedQuery {
            original: raw_query.to_string(),
            expanded,
            terms,
            filters,
        }
    }

    /// Expansion terms for a query, in order
    pub fn expand_terms(
        &self,
        query: &str,
        context: &UserSearchContext,
        session: &UserSession,
    ) -> Vec<ExpansionTerm> {
        let vocabulary = &self.tables.vocabulary;
        let query_lower = query.to_lowercase();
        let mut terms = Vec::new();

        for token in query.split_whitespace() {
            terms.push(ExpansionTerm::new(token, TermSource::Original));
            if let Some(entry) = vocabulary.synonyms_for(&token.to_lowercase()) {
                terms.extend(
                    entry
                        .synonyms
                        .iter()
                        .take(SYNONYMS_PER_TOKEN)
                        .map(|s| ExpansionTerm::new(s.as_str(), TermSource::Synonym)),
                );
            }
        }

        terms.extend(
            context
                .frequent_terms
                .iter()
                .take(HISTORY_TERMS)
                .filter(|t| !query_lower.contains(t.as_str()))
                .map(|t| ExpansionTerm::new(t.as_str(), TermSource::History)),
        );

        let triggered = vocabulary
            .tool_triggers
            .iter()
            .any(|w| query_lower.contains(w.as_str()));
        if triggered {
            for tool in &session.favorite_tools {
                if let Some(first) = vocabulary.context_terms_of(tool).and_then(|t| t.first()) {
                    terms.push(ExpansionTerm::new(first.as_str(), TermSource::Tool));
                }
            }
        }

        terms
    }

    /// Fill preferred filters from the profile for every key the caller left unset
    pub fn expand_filters(&self, mut filters: SearchFilters, session: &UserSession) -> SearchFilters {
        let vocabulary = &self.tables.vocabulary;

        if filters.complexity.is_none() {
            filters.preferred_complexity =
                Some(vocabulary.complexity.get(session.expertise_level).clone());
        }

        if filters.tools.is_none() && !session.favorite_tools.is_empty() {
            filters.preferred_tools = Some(session.favorite_tools.clone());
        }

        if filters.categories.is_none() && !session.interests().is_empty() {
            let categories = session
                .interests()
                .iter()
                .filter_map(|i| vocabulary.categories_of(i))
                .flatten()
                .cloned()
                .collect();
            filters.preferred_categories = Some(categories);
        }

        filters
    }
}
