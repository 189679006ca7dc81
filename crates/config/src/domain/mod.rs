//! Design-domain tables
//!
//! Everything the retrieval and personalization layers look up by key lives
//! here: synonyms, tool name variations, prompt templates, tips and
//! suggestions. Built-in defaults cover the UX/UI domain; a YAML file can
//! override any section:
//!
//! ```yaml
//! vocabulary:
//!   synonyms:
//!     - term: usabilidad
//!       synonyms: [usability, user experience]
//! prompts:
//!   response_styles:
//!     casual: "Answer like a friendly colleague."
//! ```
//!
//! Sections and fields that are left out keep their built-in values.

mod adaptation;
mod prompts;
mod vocabulary;

pub use adaptation::{AdaptationConfig, NamedText};
pub use prompts::{CommandTemplates, InterestHint, PromptsConfig, StyleTable};
pub use vocabulary::{NamedTerms, SynonymEntry, VocabularyConfig};

use design_mentor_core::ExpertiseLevel;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ConfigError;

/// One value per expertise level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelTable<T> {
    pub beginner: T,
    pub intermediate: T,
    pub expert: T,
}

impl<T> LevelTable<T> {
    pub fn get(&self, level: ExpertiseLevel) -> &T {
        match level {
            ExpertiseLevel::Beginner => &self.beginner,
            ExpertiseLevel::Intermediate => &self.intermediate,
            ExpertiseLevel::Expert => &self.expert,
        }
    }
}

/// All domain lookup tables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainTables {
    pub vocabulary: VocabularyConfig,
    pub prompts: PromptsConfig,
    pub adaptation: AdaptationConfig,
}

impl DomainTables {
    /// Load overrides from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileNotFound(format!("{}: {}", path.display(), e)))?;
        let tables: DomainTables =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        tables.validate()?;
        Ok(tables)
    }

    /// Built-in tables, or the YAML override when a path is configured
    pub fn from_optional_path(path: Option<&str>) -> Result<Self, ConfigError> {
        match path {
            Some(p) if !p.trim().is_empty() => Self::load(p),
            _ => Ok(Self::default()),
        }
    }

    /// Every template must carry a question placeholder
    pub fn validate(&self) -> Result<(), ConfigError> {
        for level in ExpertiseLevel::ALL {
            let templates = self.prompts.templates.get(level);
            for (command, template) in templates.iter() {
                if !template.contains("{question}") {
                    return Err(ConfigError::InvalidValue {
                        field: format!("prompts.templates.{}.{}", level, command),
                        message: "Template must contain {question}".to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

pub(crate) fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_tables_validate() {
        assert!(DomainTables::default().validate().is_ok());
    }

    #[test]
    fn test_level_table_lookup() {
        let table = LevelTable {
            beginner: 1,
            intermediate: 2,
            expert: 3,
        };
        assert_eq!(*table.get(ExpertiseLevel::Expert), 3);
        assert_eq!(*table.get(ExpertiseLevel::Beginner), 1);
    }

    #[test]
    fn test_partial_yaml_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
prompts:
  response_styles:
    casual: "Keep it light."
vocabulary:
  tool_triggers: [widget]
"#
        )
        .unwrap();

        let tables = DomainTables::load(file.path()).unwrap();
        assert_eq!(tables.prompts.response_styles.casual, "Keep it light.");
        // untouched fields keep built-ins
        assert!(!tables.prompts.response_styles.professional.is_empty());
        assert_eq!(tables.vocabulary.tool_triggers, vec!["widget"]);
        assert!(!tables.vocabulary.synonyms.is_empty());
        assert!(!tables.adaptation.level_tips.expert.is_empty());
    }

    #[test]
    fn test_template_without_question_rejected() {
        let mut tables = DomainTables::default();
        tables.prompts.templates.expert.ui = "No placeholder here".to_string();
        assert!(tables.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        let result = DomainTables::load("/nonexistent/domain.yaml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
        assert!(DomainTables::from_optional_path(None).is_ok());
    }
}
