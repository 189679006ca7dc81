//! Retrieval vocabulary: synonyms, tool names and category keywords

use serde::{Deserialize, Serialize};

use super::{strings, LevelTable};

/// Domain term and its expansion synonyms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynonymEntry {
    pub term: String,
    pub synonyms: Vec<String>,
}

/// A named list of terms (tool → variations, interest → keywords, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedTerms {
    pub name: String,
    pub terms: Vec<String>,
}

impl NamedTerms {
    fn new(name: &str, terms: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            terms: strings(terms),
        }
    }
}

/// Vocabulary tables used by query expansion and tool detection
///
/// Lists are ordered; lookups return the first match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    pub synonyms: Vec<SynonymEntry>,
    /// Canonical tool name → lowercase spellings found in questions
    pub tool_variations: Vec<NamedTerms>,
    /// Tool → terms appended to queries that mention a trigger word
    pub tool_context: Vec<NamedTerms>,
    /// Words that make tool context relevant to a query
    pub tool_triggers: Vec<String>,
    /// Complexity keywords preferred at each level
    pub complexity: LevelTable<Vec<String>>,
    /// Interest → category keywords for search filters
    pub interest_categories: Vec<NamedTerms>,
    /// Words dropped before counting trending queries
    pub trending_stopwords: Vec<String>,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        let synonym = |term: &str, synonyms: &[&str]| SynonymEntry {
            term: term.to_string(),
            synonyms: strings(synonyms),
        };

        Self {
            synonyms: vec![
                synonym(
                    "usabilidad",
                    &["usability", "user experience", "ux", "experiencia usuario"],
                ),
                synonym("interfaz", &["interface", "ui", "user interface", "pantalla"]),
                synonym("prototipo", &["prototype", "mockup", "wireframe", "boceto"]),
                synonym("usuario", &["user", "cliente", "persona", "target"]),
                synonym("diseño", &["design", "visual", "gráfico", "estética"]),
                synonym("componente", &["component", "elemento", "widget", "control"]),
                synonym("navegación", &["navigation", "menú", "menu", "flujo"]),
                synonym("accesibilidad", &["accessibility", "a11y", "inclusivo", "universal"]),
                synonym("responsive", &["adaptable", "móvil", "mobile", "tablet"]),
                synonym("testing", &["prueba", "test", "validación", "evaluación"]),
            ],
            tool_variations: vec![
                NamedTerms::new("Figma", &["figma", "fig"]),
                NamedTerms::new("Sketch", &["sketch"]),
                NamedTerms::new("Adobe XD", &["xd", "adobe xd", "experience design"]),
                NamedTerms::new("InVision", &["invision", "in vision"]),
                NamedTerms::new("Framer", &["framer"]),
                NamedTerms::new("Principle", &["principle"]),
                NamedTerms::new("Protopie", &["protopie", "proto pie"]),
                NamedTerms::new("Axure", &["axure"]),
                NamedTerms::new("Marvel", &["marvel"]),
                NamedTerms::new("Zeplin", &["zeplin"]),
            ],
            tool_context: vec![
                NamedTerms::new("Figma", &["component", "auto layout", "design system"]),
                NamedTerms::new("Sketch", &["symbol", "artboard", "plugin"]),
                NamedTerms::new("Adobe XD", &["prototype", "voice", "animation"]),
                NamedTerms::new("InVision", &["collaboration", "handoff", "inspect"]),
                NamedTerms::new("Framer", &["interaction", "code", "animation"]),
            ],
            tool_triggers: strings(&[
                "componente",
                "component",
                "prototipo",
                "prototype",
                "animation",
                "animación",
                "interaction",
                "interacción",
            ]),
            complexity: LevelTable {
                beginner: strings(&["basic", "introduction", "guide"]),
                intermediate: strings(&["practical", "tips", "best practices"]),
                expert: strings(&["advanced", "complex", "architecture"]),
            },
            interest_categories: vec![
                NamedTerms::new("UX Research", &["research", "user testing", "interviews"]),
                NamedTerms::new("UI Design", &["interface", "visual", "components"]),
                NamedTerms::new("Design Systems", &["system", "tokens", "library"]),
                NamedTerms::new("Prototyping", &["prototype", "interaction", "animation"]),
            ],
            trending_stopwords: strings(&[
                "como", "que", "para", "de", "la", "el", "en", "y", "a", "con", "por", "the",
                "and", "for", "how", "what", "with",
            ]),
        }
    }
}

impl VocabularyConfig {
    /// First synonym entry matching a lowercase token
    ///
    /// A token matches when it contains the entry term or equals one of its
    /// synonyms, so "usabilidad," and "ux" both hit the usability entry.
    pub fn synonyms_for(&self, token: &str) -> Option<&SynonymEntry> {
        self.synonyms
            .iter()
            .find(|entry| token.contains(entry.term.as_str()) || entry.synonyms.iter().any(|s| s == token))
    }

    /// Known spellings for a canonical tool name
    pub fn variations_of(&self, tool: &str) -> Option<&[String]> {
        lookup(&self.tool_variations, tool)
    }

    pub fn context_terms_of(&self, tool: &str) -> Option<&[String]> {
        lookup(&self.tool_context, tool)
    }

    pub fn categories_of(&self, interest: &str) -> Option<&[String]> {
        lookup(&self.interest_categories, interest)
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.trending_stopwords.iter().any(|s| s == word)
    }
}

pub(crate) fn lookup<'a>(table: &'a [NamedTerms], name: &str) -> Option<&'a [String]> {
    table
        .iter()
        .find(|entry| entry.name == name)
        .map(|entry| entry.terms.as_slice())
}
