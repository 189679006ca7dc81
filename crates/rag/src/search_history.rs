//! Per-user search history
//!
//! Records every expanded search (capped per user) and derives from it the
//! user's search context, autocomplete-style suggestions and the trending
//! queries across all users. The whole map is persisted on each append.

use chrono::{DateTime, Duration, Utc};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use design_mentor_config::constants::retrieval;
use design_mentor_config::{DomainTables, RetrievalConfig};
use design_mentor_core::storage::{read_json_or_default, write_json_atomic};
use design_mentor_core::{SearchFilters, SearchRecord, SuggestionSource, UserSession};

/// Words this short are ignored when mining frequent terms
const MIN_TERM_CHARS: usize = 4;
const FREQUENT_TERMS: usize = 5;
const PREFERRED_CATEGORIES: usize = 3;
const RECENT_QUERIES: usize = 5;

/// History limits
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Recent searches analysed for user context
    pub context_window: usize,
    /// Stored searches per user
    pub max_records_per_user: usize,
    pub max_suggestions: usize,
    pub trending_window: Duration,
    pub trending_limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            context_window: retrieval::CONTEXT_WINDOW,
            max_records_per_user: retrieval::MAX_RECORDS_PER_USER,
            max_suggestions: retrieval::MAX_SUGGESTIONS,
            trending_window: Duration::days(retrieval::TRENDING_WINDOW_DAYS),
            trending_limit: retrieval::TRENDING_LIMIT,
        }
    }
}

impl HistoryConfig {
    pub fn from_settings(retrieval: &RetrievalConfig) -> Self {
        Self {
            context_window: retrieval.context_window,
            max_records_per_user: retrieval.max_records_per_user,
            max_suggestions: retrieval.max_suggestions,
            trending_window: Duration::days(retrieval.trending_window_days),
            trending_limit: retrieval.trending_limit,
        }
    }
}

/// What a user's recent searches say about them
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserSearchContext {
    /// Most frequent long words, most frequent first
    pub frequent_terms: Vec<String>,
    /// Most frequent explicit categories
    pub preferred_categories: Vec<String>,
    pub total_searches: usize,
    /// Last few raw queries, oldest first
    pub recent_queries: Vec<String>,
}

type RecordMap = HashMap<String, Vec<SearchRecord>>;

/// Search record store
pub struct SearchHistory {
    path: Option<PathBuf>,
    records: RwLock<RecordMap>,
    /// Held across mutate-snapshot-write
    write_lock: Mutex<()>,
    config: HistoryConfig,
    tables: Arc<DomainTables>,
}

impl SearchHistory {
    /// Open the history file; a missing or unreadable file starts empty
    pub fn open<P: AsRef<Path>>(path: P, config: HistoryConfig, tables: Arc<DomainTables>) -> Self {
        let path = path.as_ref().to_path_buf();
        let records: RecordMap = match read_json_or_default(&path) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Could not load search history, starting empty");
                RecordMap::new()
            }
        };
        tracing::debug!(users = records.len(), "Loaded search history");

        Self {
            path: Some(path),
            records: RwLock::new(records),
            write_lock: Mutex::new(()),
            config,
            tables,
        }
    }

    pub fn in_memory(config: HistoryConfig, tables: Arc<DomainTables>) -> Self {
        Self {
            path: None,
            records: RwLock::new(RecordMap::new()),
            write_lock: Mutex::new(()),
            config,
            tables,
        }
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Append a search for `user_id`, evicting the oldest beyond the cap
    pub fn record(&self, user_id: &str, query: &str, filters: SearchFilters, at: DateTime<Utc>) {
        let _guard = self.write_lock.lock();
        let snapshot = {
            let mut records = self.records.write();
            let list = records.entry(user_id.to_string()).or_default();
            list.push(SearchRecord::new(user_id, query, filters, at));
            if list.len() > self.config.max_records_per_user {
                let excess = list.len() - self.config.max_records_per_user;
                list.drain(..excess);
            }
            records.clone()
        };
        self.persist(&snapshot);
    }

    /// Records for a user, oldest first
    pub fn records(&self, user_id: &str) -> Vec<SearchRecord> {
        self.records.read().get(user_id).cloned().unwrap_or_default()
    }

    /// Frequent terms and categories over the user's recent searches
    ///
    /// Ties keep first-appearance order.
    pub fn user_context(&self, user_id: &str) -> UserSearchContext {
        let records = self.records.read();
        let Some(list) = records.get(user_id).filter(|l| !l.is_empty()) else {
            return UserSearchContext::default();
        };

        let window = &list[list.len().saturating_sub(self.config.context_window)..];

        let terms = ranked_by_frequency(window.iter().flat_map(|r| {
            r.query
                .to_lowercase()
                .split_whitespace()
                .filter(|t| t.chars().count() >= MIN_TERM_CHARS)
                .map(str::to_string)
                .collect::<Vec<_>>()
        }));
        let categories = ranked_by_frequency(
            window
                .iter()
                .filter(|r| !r.category.is_empty())
                .map(|r| r.category.clone()),
        );

        UserSearchContext {
            frequent_terms: terms.into_iter().take(FREQUENT_TERMS).map(|(t, _)| t).collect(),
            preferred_categories: categories
                .into_iter()
                .take(PREFERRED_CATEGORIES)
                .map(|(c, _)| c)
                .collect(),
            total_searches: list.len(),
            recent_queries: list[list.len().saturating_sub(RECENT_QUERIES)..]
                .iter()
                .map(|r| r.query.clone())
                .collect(),
        }
    }

    /// Suggestions for a partially typed query
    ///
    /// Frequent terms come first, then interest and favorite-tool suggestions.
    pub fn suggestions_for(&self, session: &UserSession, partial: &str) -> Vec<String> {
        let partial = partial.to_lowercase();
        let matches = |s: &str| partial.is_empty() || s.to_lowercase().contains(&partial);
        let adaptation = &self.tables.adaptation;

        let context = self.user_context(&session.user_id);
        let mut suggestions: Vec<String> = context
            .frequent_terms
            .iter()
            .filter(|t| matches(t))
            .map(|t| format!("🔍 {}", t))
            .collect();

        for interest in session.interests() {
            if let Some(list) = adaptation.interest_suggestions_of(interest) {
                suggestions.extend(list.iter().filter(|s| matches(s)).map(|s| format!("💡 {}", s)));
            }
        }

        for tool in &session.favorite_tools {
            if let Some(list) = adaptation.tool_suggestions_of(tool) {
                suggestions.extend(list.iter().filter(|s| matches(s)).map(|s| format!("🛠️ {}", s)));
            }
        }

        suggestions.truncate(self.config.max_suggestions);
        suggestions
    }

    /// Most repeated cleaned queries across all users within the trending window
    pub fn trending(&self, now: DateTime<Utc>) -> Vec<String> {
        let since = now - self.config.trending_window;
        let records = self.records.read();

        let mut recent: Vec<&SearchRecord> = records
            .values()
            .flatten()
            .filter(|r| r.timestamp > since)
            .collect();
        // chronological, so ties resolve by first appearance across users
        recent.sort_by_key(|r| r.timestamp);

        let cleaned = recent
            .into_iter()
            .filter_map(|r| self.clean_for_trending(&r.query));

        ranked_by_frequency(cleaned)
            .into_iter()
            .take(self.config.trending_limit)
            .filter(|(_, count)| *count > 1)
            .map(|(query, _)| query)
            .collect()
    }

    /// Lowercase, drop stopwords and short words; needs two words to count
    fn clean_for_trending(&self, query: &str) -> Option<String> {
        let lowered = query.to_lowercase();
        let words: Vec<&str> = lowered
            .split_whitespace()
            .filter(|w| !self.tables.vocabulary.is_stopword(w) && w.chars().count() > 2)
            .collect();
        (words.len() >= 2).then(|| words.join(" "))
    }

    /// Write the current map to disk
    pub fn flush(&self) {
        let _guard = self.write_lock.lock();
        let snapshot = self.records.read().clone();
        self.persist(&snapshot);
    }

    fn persist(&self, snapshot: &RecordMap) {
        let Some(ref path) = self.path else {
            return;
        };
        if let Err(e) = write_json_atomic(path, snapshot) {
            tracing::warn!(error = %e, "Failed to persist search history");
        }
    }
}

impl SuggestionSource for SearchHistory {
    fn suggestions(&self, session: &UserSession, partial: &str) -> Vec<String> {
        self.suggestions_for(session, partial)
    }
}

/// Count occurrences, most frequent first; ties keep first-appearance order
fn ranked_by_frequency<I>(items: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = String>,
{
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in items {
        match index.get(&item) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(item.clone(), counts.len());
                counts.push((item, 1));
            }
        }
    }

    // stable sort preserves first appearance among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}
