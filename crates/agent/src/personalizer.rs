//! Response personalization
//!
//! Appends profile-driven additions to a generated answer and selects the
//! tips shown on request.

use std::sync::Arc;

use design_mentor_config::DomainTables;
use design_mentor_core::{SuggestionSource, UserSession};

/// Upper bound on tips returned by [`ResponsePersonalizer::tips`]
pub const MAX_TIPS: usize = 6;

const TOOL_TIPS_PER_ANSWER: usize = 2;
const SUGGESTIONS_PER_ANSWER: usize = 3;
const LEVEL_TIPS: usize = 3;
const CATALOG_ENTRIES: usize = 2;
const CATALOG_TIPS_EACH: usize = 2;
/// Below this many selected tips the general ones are added
const MIN_SELECTED_TIPS: usize = 3;

pub struct ResponsePersonalizer {
    tables: Arc<DomainTables>,
    suggestions: Option<Arc<dyn SuggestionSource>>,
}

impl ResponsePersonalizer {
    pub fn new(tables: Arc<DomainTables>) -> Self {
        Self {
            tables,
            suggestions: None,
        }
    }

    pub fn with_suggestions(mut self, source: Arc<dyn SuggestionSource>) -> Self {
        self.suggestions = Some(source);
        self
    }

    /// Answer followed by tool tips, a level tip and suggested searches
    pub fn personalize(&self, answer: &str, session: &UserSession) -> String {
        let adaptation = &self.tables.adaptation;
        let mut additions: Vec<String> = session
            .favorite_tools
            .iter()
            .filter_map(|tool| adaptation.tool_tip(tool))
            .take(TOOL_TIPS_PER_ANSWER)
            .map(str::to_string)
            .collect();

        additions.push(adaptation.level_tips.get(session.expertise_level).clone());

        let suggestions = self
            .suggestions
            .as_ref()
            .map(|source| source.suggestions(session, ""))
            .unwrap_or_default();
        if !suggestions.is_empty() {
            let top: Vec<&str> = suggestions
                .iter()
                .take(SUGGESTIONS_PER_ANSWER)
                .map(String::as_str)
                .collect();
            additions.push(format!("🔍 **Suggested searches:** {}", top.join(", ")));
        }

        additions.retain(|a| !a.trim().is_empty());
        if additions.is_empty() {
            return answer.to_string();
        }
        format!("{}\n\n{}", answer, additions.join("\n\n"))
    }

    /// Tips selected for the user's level, tools and interests
    pub fn tips(&self, session: &UserSession) -> Vec<String> {
        let adaptation = &self.tables.adaptation;
        let mut selected: Vec<String> = adaptation
            .level_tip_catalog
            .get(session.expertise_level)
            .iter()
            .take(LEVEL_TIPS)
            .cloned()
            .collect();

        for tool in session.favorite_tools.iter().take(CATALOG_ENTRIES) {
            if let Some(tips) = adaptation.tool_tip_catalog_of(tool) {
                selected.extend(tips.iter().take(CATALOG_TIPS_EACH).cloned());
            }
        }

        for interest in session.interests().iter().take(CATALOG_ENTRIES) {
            if let Some(tips) = adaptation.interest_tip_catalog_of(interest) {
                selected.extend(tips.iter().take(CATALOG_TIPS_EACH).cloned());
            }
        }

        if selected.len() < MIN_SELECTED_TIPS {
            selected.extend(adaptation.general_tips.iter().cloned());
        }

        selected.truncate(MAX_TIPS);
        selected
    }
}
