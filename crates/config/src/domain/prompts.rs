//! Prompt templates and response styles

use design_mentor_core::{CommandType, ResponseStyle};
use serde::{Deserialize, Serialize};

use super::{strings, LevelTable};

/// Templates for one expertise level
///
/// Placeholders: `{question}` always, `{tool}` in the tools template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandTemplates {
    pub design: String,
    pub ux: String,
    pub ui: String,
    pub tools: String,
}

impl CommandTemplates {
    pub fn get(&self, command: CommandType) -> &str {
        match command {
            CommandType::Design => &self.design,
            CommandType::Ux => &self.ux,
            CommandType::Ui => &self.ui,
            CommandType::Tools => &self.tools,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("design", self.design.as_str()),
            ("ux", self.ux.as_str()),
            ("ui", self.ui.as_str()),
            ("tools", self.tools.as_str()),
        ]
        .into_iter()
    }
}

/// Instruction text per response style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleTable {
    pub professional: String,
    pub casual: String,
    pub academic: String,
    pub practical: String,
}

impl Default for StyleTable {
    fn default() -> Self {
        Self {
            professional: "Answer in a professional, technical way, using industry terminology."
                .to_string(),
            casual: "Answer in a friendly, conversational way, like an experienced colleague."
                .to_string(),
            academic: "Answer with academic rigor, including theoretical references and studies."
                .to_string(),
            practical: "Focus on practical examples and real-world applications.".to_string(),
        }
    }
}

impl StyleTable {
    pub fn get(&self, style: ResponseStyle) -> &str {
        match style {
            ResponseStyle::Professional => &self.professional,
            ResponseStyle::Casual => &self.casual,
            ResponseStyle::Academic => &self.academic,
            ResponseStyle::Practical => &self.practical,
        }
    }
}

/// Interest-driven guidance rule
///
/// Applies when the user has `interest` and the command type is listed
/// (an empty list matches every command type).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestHint {
    pub interest: String,
    #[serde(default)]
    pub commands: Vec<String>,
    pub hint: String,
}

impl InterestHint {
    /// `command` is `None` for labels outside the known command set; only
    /// command-agnostic rules apply to those.
    pub fn applies(&self, interests: &[String], command: Option<CommandType>) -> bool {
        interests.iter().any(|i| *i == self.interest)
            && (self.commands.is_empty()
                || command.map_or(false, |command| {
                    self.commands.iter().any(|c| c == command.as_str())
                }))
    }
}

/// Prompt construction tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    pub templates: LevelTable<CommandTemplates>,
    pub response_styles: StyleTable,
    /// Ordered; the first applicable rule wins
    pub interest_hints: Vec<InterestHint>,
    /// Substituted for `{tool}` when no tool was detected
    pub unknown_tool_phrase: String,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        let hint = |interest: &str, commands: &[&str], hint: &str| InterestHint {
            interest: interest.to_string(),
            commands: strings(commands),
            hint: hint.to_string(),
        };

        Self {
            templates: LevelTable {
                beginner: CommandTemplates {
                    design: "As a UX/UI design mentor for beginners, explain simply and didactically: {question}. Include basic definitions, visual examples and practical steps. Avoid complex jargon.".to_string(),
                    ux: "Explain to a UX beginner: {question}. Use everyday examples, define technical terms and give concrete steps to get started.".to_string(),
                    ui: "For someone new to UI design, explain: {question}. Include basic principles, examples from well-known apps and practical advice to get started.".to_string(),
                    tools: "As a guide for beginners in {tool}, explain: {question}. Include basic steps, where to find the tools and tips to get started.".to_string(),
                },
                intermediate: CommandTemplates {
                    design: "As a UX/UI designer with intermediate experience, analyze: {question}. Include best practices, real use cases and advanced considerations.".to_string(),
                    ux: "For a UX practitioner with intermediate experience, go deeper into: {question}. Include specific methodologies, metrics and relevant case studies.".to_string(),
                    ui: "As an intermediate UI designer, analyze: {question}. Include advanced patterns, design systems and current trends.".to_string(),
                    tools: "For an intermediate {tool} user, explain advanced techniques for: {question}. Include efficient workflows and pro features.".to_string(),
                },
                expert: CommandTemplates {
                    design: "As a senior design leader, analyze strategically: {question}. Include business implications, scalability and team leadership.".to_string(),
                    ux: "From a senior UX perspective, evaluate: {question}. Include organizational impact, advanced research and business metrics.".to_string(),
                    ui: "As a Design System Lead, analyze: {question}. Include component architecture, design tokens and governance.".to_string(),
                    tools: "For a {tool} expert, explain advanced optimizations for: {question}. Include automation, custom plugins and enterprise workflows.".to_string(),
                },
            },
            response_styles: StyleTable::default(),
            interest_hints: vec![
                hint(
                    "UX Research",
                    &["ux", "design"],
                    "include relevant research methodologies.",
                ),
                hint(
                    "Design Systems",
                    &["ui", "design"],
                    "include design system considerations.",
                ),
                hint("Prototyping", &[], "include prototyping and interaction aspects."),
            ],
            unknown_tool_phrase: "your design tool".to_string(),
        }
    }
}

impl PromptsConfig {
    /// First interest rule that applies
    pub fn interest_hint(&self, interests: &[String], command: Option<CommandType>) -> Option<&str> {
        self.interest_hints
            .iter()
            .find(|rule| rule.applies(interests, command))
            .map(|rule| rule.hint.as_str())
    }
}
