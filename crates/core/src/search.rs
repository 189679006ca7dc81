//! Search records and the filter set derived for each search

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Filters attached to a search
///
/// The first group is supplied by the caller. When a caller key is absent
/// the expander fills the matching `preferred_*` key from the user profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    /// Explicit category label, recorded with the search
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_complexity: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_tools: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_categories: Option<Vec<String>>,
}

/// One recorded search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRecord {
    pub timestamp: DateTime<Utc>,
    /// Raw query as typed by the user
    pub query: String,
    #[serde(default)]
    pub filters: SearchFilters,
    /// Category label, empty when none was given
    #[serde(default)]
    pub category: String,
    /// `{user_id}_{hour bucket}`
    pub session_id: String,
}

impl SearchRecord {
    pub fn new(user_id: &str, query: &str, filters: SearchFilters, at: DateTime<Utc>) -> Self {
        let category = filters.category.clone().unwrap_or_default();
        Self {
            timestamp: at,
            query: query.to_string(),
            filters,
            category,
            session_id: hourly_session_id(user_id, at),
        }
    }
}

/// Searches within the same wall-clock hour share a session id
pub fn hourly_session_id(user_id: &str, at: DateTime<Utc>) -> String {
    format!("{}_{}", user_id, at.timestamp().div_euclid(3600))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_hourly_session_id() {
        let a = Utc.with_ymd_and_hms(2024, 5, 1, 10, 5, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 5, 1, 10, 55, 0).unwrap();
        let c = Utc.with_ymd_and_hms(2024, 5, 1, 11, 0, 0).unwrap();
        assert_eq!(hourly_session_id("7", a), hourly_session_id("7", b));
        assert_ne!(hourly_session_id("7", a), hourly_session_id("7", c));
        assert!(hourly_session_id("7", a).starts_with("7_"));
    }

    #[test]
    fn test_record_takes_category_from_filters() {
        let filters = SearchFilters {
            category: Some("UI Design".into()),
            ..Default::default()
        };
        let record = SearchRecord::new("7", "grids", filters, Utc::now());
        assert_eq!(record.category, "UI Design");
        assert_eq!(record.query, "grids");
    }

    #[test]
    fn test_filters_skip_empty_keys() {
        let json = serde_json::to_string(&SearchFilters::default()).unwrap();
        assert_eq!(json, "{}");
    }
}
