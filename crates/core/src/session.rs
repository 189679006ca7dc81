//! Per-user session profile
//!
//! A `UserSession` is the explicit contract every component reads the user
//! profile through. The session store is its only writer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::profile::{lenient_level, ExpertiseLevel, ResponseStyle};

/// Maximum conversation entries kept in memory
pub const HISTORY_CAPACITY: usize = 50;
/// Conversation entries written to durable storage
pub const PERSISTED_HISTORY: usize = 10;
/// History messages are truncated to this many characters
pub const MAX_MESSAGE_CHARS: usize = 100;

/// One conversation history entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    /// Session context label at the time of the message
    pub context: String,
}

/// User preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default = "default_theme")]
    pub theme: String,
    /// Stored style name; unknown names resolve to professional
    #[serde(default = "default_response_style")]
    pub response_style: String,
    /// Mirror of the session expertise level
    #[serde(default, deserialize_with = "lenient_level")]
    pub experience_level: ExpertiseLevel,
    #[serde(default = "default_notifications")]
    pub notifications: bool,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub onboarding_completed: bool,
}

fn default_theme() -> String {
    "default".to_string()
}

fn default_response_style() -> String {
    ResponseStyle::Professional.as_str().to_string()
}

fn default_notifications() -> bool {
    true
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            response_style: default_response_style(),
            experience_level: ExpertiseLevel::default(),
            notifications: default_notifications(),
            interests: Vec::new(),
            onboarding_completed: false,
        }
    }
}

/// Per-user profile and rolling conversation state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSession {
    pub user_id: String,
    #[serde(default = "default_context")]
    pub current_context: String,
    #[serde(default)]
    pub last_search: Option<String>,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub conversation_history: Vec<HistoryEntry>,
    #[serde(default, deserialize_with = "lenient_level")]
    pub expertise_level: ExpertiseLevel,
    /// Ordered, without duplicates
    #[serde(default)]
    pub favorite_tools: Vec<String>,
    #[serde(default)]
    pub search_count: u64,
    pub session_start: DateTime<Utc>,
}

fn default_context() -> String {
    "main".to_string()
}

impl UserSession {
    /// Create a session with default profile values
    pub fn new(user_id: impl Into<String>) -> Self {
        Self::started_at(user_id, Utc::now())
    }

    pub fn started_at(user_id: impl Into<String>, start: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            current_context: default_context(),
            last_search: None,
            preferences: Preferences::default(),
            conversation_history: Vec::new(),
            expertise_level: ExpertiseLevel::default(),
            favorite_tools: Vec::new(),
            search_count: 0,
            session_start: start,
        }
    }

    /// Append a history entry, truncating the message and evicting the oldest
    pub fn push_history(&mut self, message: &str, at: DateTime<Utc>) {
        let message: String = message.chars().take(MAX_MESSAGE_CHARS).collect();
        self.conversation_history.push(HistoryEntry {
            timestamp: at,
            message,
            context: self.current_context.clone(),
        });
        if self.conversation_history.len() > HISTORY_CAPACITY {
            let excess = self.conversation_history.len() - HISTORY_CAPACITY;
            self.conversation_history.drain(..excess);
        }
    }

    /// Most recent `n` history entries, oldest first
    pub fn recent_history(&self, n: usize) -> &[HistoryEntry] {
        let start = self.conversation_history.len().saturating_sub(n);
        &self.conversation_history[start..]
    }

    /// Copy of the session as it is written to durable storage
    pub fn to_persisted(&self) -> UserSession {
        let mut persisted = self.clone();
        persisted.conversation_history = self.recent_history(PERSISTED_HISTORY).to_vec();
        persisted
    }

    pub fn set_expertise_level(&mut self, level: ExpertiseLevel) {
        self.expertise_level = level;
        self.preferences.experience_level = level;
    }

    /// Add the tool if absent, remove it otherwise; returns whether it is now a favorite
    pub fn toggle_favorite_tool(&mut self, tool: &str) -> bool {
        toggle(&mut self.favorite_tools, tool)
    }

    /// Add the interest if absent, remove it otherwise; returns whether it is now set
    pub fn toggle_interest(&mut self, interest: &str) -> bool {
        toggle(&mut self.preferences.interests, interest)
    }

    pub fn interests(&self) -> &[String] {
        &self.preferences.interests
    }

    pub fn response_style(&self) -> ResponseStyle {
        ResponseStyle::from_name(&self.preferences.response_style)
    }

    /// Usage summary at `now`
    pub fn analytics(&self, now: DateTime<Utc>) -> SessionAnalytics {
        SessionAnalytics {
            searches_count: self.search_count,
            session_duration_secs: (now - self.session_start).num_milliseconds() as f64 / 1000.0,
            expertise_level: self.expertise_level,
            favorite_tools: self.favorite_tools.clone(),
            conversation_length: self.conversation_history.len(),
            last_activity: self.conversation_history.last().cloned(),
        }
    }
}

fn toggle(list: &mut Vec<String>, value: &str) -> bool {
    if let Some(pos) = list.iter().position(|v| v == value) {
        list.remove(pos);
        false
    } else {
        list.push(value.to_string());
        true
    }
}

/// Per-user usage summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionAnalytics {
    pub searches_count: u64,
    pub session_duration_secs: f64,
    pub expertise_level: ExpertiseLevel,
    pub favorite_tools: Vec<String>,
    pub conversation_length: usize,
    pub last_activity: Option<HistoryEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_defaults() {
        let session = UserSession::new("u1");
        assert_eq!(session.current_context, "main");
        assert_eq!(session.expertise_level, ExpertiseLevel::Intermediate);
        assert_eq!(session.preferences.response_style, "professional");
        assert_eq!(session.preferences.theme, "default");
        assert!(session.preferences.notifications);
        assert!(session.favorite_tools.is_empty());
        assert!(session.interests().is_empty());
        assert_eq!(session.search_count, 0);
    }

    #[test]
    fn test_history_truncates_message() {
        let mut session = UserSession::new("u1");
        let long = "á".repeat(150);
        session.push_history(&long, Utc::now());
        assert_eq!(session.conversation_history[0].message.chars().count(), 100);
        assert_eq!(session.conversation_history[0].context, "main");
    }

    #[test]
    fn test_history_capacity() {
        let mut session = UserSession::new("u1");
        for i in 0..HISTORY_CAPACITY {
            session.push_history(&format!("message {}", i), Utc::now());
        }
        assert_eq!(session.conversation_history.len(), 50);

        session.push_history("message 50", Utc::now());
        assert_eq!(session.conversation_history.len(), 50);
        assert_eq!(session.conversation_history[0].message, "message 1");
        assert_eq!(session.conversation_history[49].message, "message 50");
    }

    #[test]
    fn test_persisted_round_trip_keeps_last_ten() {
        let mut session = UserSession::new("u1");
        session.set_expertise_level(ExpertiseLevel::Expert);
        session.toggle_favorite_tool("Figma");
        session.toggle_interest("Prototyping");
        session.last_search = Some("grids".into());
        session.search_count = 4;
        for i in 0..25 {
            session.push_history(&format!("question number {}", i), Utc::now());
        }

        let json = serde_json::to_string(&session.to_persisted()).unwrap();
        let restored: UserSession = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.conversation_history.len(), PERSISTED_HISTORY);
        assert_eq!(restored.conversation_history[0].message, "question number 15");
        assert_eq!(
            restored.conversation_history[..],
            session.conversation_history[15..]
        );

        let mut expected = session.clone();
        expected.conversation_history = session.conversation_history[15..].to_vec();
        assert_eq!(restored, expected);
    }

    #[test]
    fn test_toggles() {
        let mut session = UserSession::new("u1");
        assert!(session.toggle_favorite_tool("Sketch"));
        assert!(session.toggle_favorite_tool("Figma"));
        assert_eq!(session.favorite_tools, vec!["Sketch", "Figma"]);
        assert!(!session.toggle_favorite_tool("Sketch"));
        assert_eq!(session.favorite_tools, vec!["Figma"]);

        assert!(session.toggle_interest("UX Research"));
        assert!(!session.toggle_interest("UX Research"));
        assert!(session.interests().is_empty());
    }

    #[test]
    fn test_level_mirrors_preferences() {
        let mut session = UserSession::new("u1");
        session.set_expertise_level(ExpertiseLevel::Beginner);
        assert_eq!(session.preferences.experience_level, ExpertiseLevel::Beginner);
    }

    #[test]
    fn test_analytics() {
        let start = Utc::now() - Duration::seconds(90);
        let mut session = UserSession::started_at("u1", start);
        session.search_count = 3;
        session.push_history("how do I pick a grid", Utc::now());

        let analytics = session.analytics(start + Duration::seconds(90));
        assert_eq!(analytics.searches_count, 3);
        assert!((analytics.session_duration_secs - 90.0).abs() < 1e-6);
        assert_eq!(analytics.conversation_length, 1);
        assert_eq!(
            analytics.last_activity.map(|e| e.message),
            Some("how do I pick a grid".to_string())
        );
    }
}
