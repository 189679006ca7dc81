//! Profile axes that drive prompt and tip selection

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// User expertise level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpertiseLevel {
    Beginner,
    #[default]
    Intermediate,
    Expert,
}

impl ExpertiseLevel {
    pub const ALL: [ExpertiseLevel; 3] = [
        ExpertiseLevel::Beginner,
        ExpertiseLevel::Intermediate,
        ExpertiseLevel::Expert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpertiseLevel::Beginner => "beginner",
            ExpertiseLevel::Intermediate => "intermediate",
            ExpertiseLevel::Expert => "expert",
        }
    }

    /// Parse a level label (case-insensitive)
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "beginner" => Some(ExpertiseLevel::Beginner),
            "intermediate" => Some(ExpertiseLevel::Intermediate),
            "expert" => Some(ExpertiseLevel::Expert),
            _ => None,
        }
    }
}

/// Deserialize a level label, mapping unknown labels to the default level
pub fn lenient_level<'de, D>(deserializer: D) -> Result<ExpertiseLevel, D::Error>
where
    D: Deserializer<'de>,
{
    let label = String::deserialize(deserializer)?;
    Ok(ExpertiseLevel::parse(&label).unwrap_or_default())
}

impl fmt::Display for ExpertiseLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of question the caller is asking, keys the prompt templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandType {
    #[default]
    Design,
    Ux,
    Ui,
    Tools,
}

impl CommandType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandType::Design => "design",
            CommandType::Ux => "ux",
            CommandType::Ui => "ui",
            CommandType::Tools => "tools",
        }
    }

    /// Parse a command label; `None` for labels without a template
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "design" => Some(CommandType::Design),
            "ux" => Some(CommandType::Ux),
            "ui" => Some(CommandType::Ui),
            "tools" => Some(CommandType::Tools),
            _ => None,
        }
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tone of generated answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStyle {
    #[default]
    Professional,
    Casual,
    Academic,
    Practical,
}

impl ResponseStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseStyle::Professional => "professional",
            ResponseStyle::Casual => "casual",
            ResponseStyle::Academic => "academic",
            ResponseStyle::Practical => "practical",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "professional" => Some(ResponseStyle::Professional),
            "casual" => Some(ResponseStyle::Casual),
            "academic" => Some(ResponseStyle::Academic),
            "practical" => Some(ResponseStyle::Practical),
            _ => None,
        }
    }

    /// Resolve a stored style name, falling back to `Professional`
    pub fn from_name(name: &str) -> Self {
        Self::parse(name).unwrap_or_default()
    }
}

impl fmt::Display for ResponseStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parse() {
        assert_eq!(ExpertiseLevel::parse("Beginner"), Some(ExpertiseLevel::Beginner));
        assert_eq!(ExpertiseLevel::parse(" expert "), Some(ExpertiseLevel::Expert));
        assert_eq!(ExpertiseLevel::parse("guru"), None);
        assert_eq!(ExpertiseLevel::default(), ExpertiseLevel::Intermediate);
    }

    #[test]
    fn test_command_parse() {
        assert_eq!(CommandType::parse("UX"), Some(CommandType::Ux));
        assert_eq!(CommandType::parse("tools"), Some(CommandType::Tools));
        assert_eq!(CommandType::parse("general"), None);
    }

    #[test]
    fn test_style_fallback() {
        assert_eq!(ResponseStyle::from_name("casual"), ResponseStyle::Casual);
        assert_eq!(ResponseStyle::from_name("poetic"), ResponseStyle::Professional);
        assert_eq!(ResponseStyle::from_name(""), ResponseStyle::Professional);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&ExpertiseLevel::Expert).unwrap();
        assert_eq!(json, "\"expert\"");
        let level: ExpertiseLevel = serde_json::from_str("\"beginner\"").unwrap();
        assert_eq!(level, ExpertiseLevel::Beginner);
    }

    #[test]
    fn test_lenient_level() {
        #[derive(Deserialize)]
        struct Stored {
            #[serde(deserialize_with = "lenient_level")]
            level: ExpertiseLevel,
        }
        let stored: Stored = serde_json::from_str(r#"{"level":"guru"}"#).unwrap();
        assert_eq!(stored.level, ExpertiseLevel::Intermediate);
        let stored: Stored = serde_json::from_str(r#"{"level":"Expert"}"#).unwrap();
        assert_eq!(stored.level, ExpertiseLevel::Expert);
    }
}
