//! Adaptive prompt construction
//!
//! A prompt is assembled in sections separated by blank lines:
//! - the (level, command) template with `{question}` and `{tool}` filled in
//! - an interest hint when the user declared interests
//! - a favorite-tools hint when the question names no tool
//! - the response style instruction
//! - recent conversation context
//! - a grounding block (with passages) or a user-context block (without)

use serde::Serialize;
use std::sync::Arc;

use design_mentor_config::DomainTables;
use design_mentor_core::{CommandType, ExpertiseLevel, Passage, UserSession};

/// History entries considered for conversation context
const CONTEXT_ENTRIES: usize = 3;
/// Shorter history messages carry no useful context
const MIN_CONTEXT_MESSAGE_CHARS: usize = 10;
const FAVORITE_TOOLS_HINTED: usize = 3;
const PREVIEW_CHARS: usize = 100;

/// First line of the prompt a user would get at one expertise level
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelPreview {
    pub level: ExpertiseLevel,
    pub prompt: String,
}

/// Builds prompts adapted to a user's profile
pub struct AdaptivePromptBuilder {
    tables: Arc<DomainTables>,
}

impl AdaptivePromptBuilder {
    pub fn new(tables: Arc<DomainTables>) -> Self {
        Self { tables }
    }

    /// Resolve a command label; unknown labels use the design templates
    pub fn resolve_command(label: &str) -> CommandType {
        CommandType::parse(label).unwrap_or_else(|| {
            tracing::debug!(command = label, "Unknown command type, using design template");
            CommandType::Design
        })
    }

    /// Full prompt for a question
    pub fn build(
        &self,
        question: &str,
        command: &str,
        session: &UserSession,
        passages: Option<&[Passage]>,
    ) -> String {
        let mut sections = vec![self.base_prompt(question, command, session.expertise_level, session)];

        let style = self.tables.prompts.response_styles.get(session.response_style());
        sections.push(format!("Response style: {}", style));

        if let Some(context) = conversation_context(session) {
            sections.push(context);
        }

        match passages {
            Some(passages) if !passages.is_empty() => sections.push(grounding_block(session)),
            _ => sections.push(user_context_block(session)),
        }

        sections.join("\n\n")
    }

    /// Template, tool and interest sections for a given level
    ///
    /// Unknown command labels select the design template, but interest rules
    /// bound to specific commands do not fire for them.
    pub fn base_prompt(
        &self,
        question: &str,
        command: &str,
        level: ExpertiseLevel,
        session: &UserSession,
    ) -> String {
        let prompts = &self.tables.prompts;
        let template = prompts.templates.get(level).get(Self::resolve_command(command));
        let detected = self.detect_tool(question, &session.favorite_tools);

        let tool = detected.unwrap_or(prompts.unknown_tool_phrase.as_str());
        let mut prompt = template
            .replace("{question}", question)
            .replace("{tool}", tool);

        let interests = session.interests();
        if !interests.is_empty() {
            let hint = prompts
                .interest_hint(interests, CommandType::parse(command))
                .unwrap_or_default();
            let line = format!("Considering your interest in: {}, {}", interests.join(", "), hint);
            prompt.push_str("\n\n");
            prompt.push_str(line.trim_end());
        }

        if detected.is_none() && !session.favorite_tools.is_empty() {
            let top: Vec<&str> = session
                .favorite_tools
                .iter()
                .take(FAVORITE_TOOLS_HINTED)
                .map(String::as_str)
                .collect();
            prompt.push_str(&format!(
                "\n\nWhen relevant, consider tools such as: {}.",
                top.join(", ")
            ));
        }

        prompt
    }

    /// Tool named in the question
    ///
    /// The user's favorite tools are checked before the full variation table.
    pub fn detect_tool<'a>(&'a self, question: &str, favorites: &'a [String]) -> Option<&'a str> {
        let question = question.to_lowercase();
        let vocabulary = &self.tables.vocabulary;
        let mentions = |variations: &[String]| variations.iter().any(|v| question.contains(v.as_str()));

        let favorite = favorites.iter().find(|tool| {
            vocabulary
                .variations_of(tool)
                .map(|v| mentions(v))
                .unwrap_or(false)
        });
        if let Some(tool) = favorite {
            return Some(tool.as_str());
        }

        vocabulary
            .tool_variations
            .iter()
            .find(|entry| mentions(&entry.terms))
            .map(|entry| entry.name.as_str())
    }

    /// How the prompt would open at every expertise level
    pub fn preview(&self, question: &str, command: &str, session: &UserSession) -> Vec<LevelPreview> {
        ExpertiseLevel::ALL
            .iter()
            .map(|&level| {
                let prompt = self.base_prompt(question, command, level, session);
                let first_line: String = prompt
                    .lines()
                    .next()
                    .unwrap_or_default()
                    .chars()
                    .take(PREVIEW_CHARS)
                    .collect();
                LevelPreview {
                    level,
                    prompt: format!("{}...", first_line),
                }
            })
            .collect()
    }
}

fn conversation_context(session: &UserSession) -> Option<String> {
    let lines: Vec<String> = session
        .recent_history(CONTEXT_ENTRIES)
        .iter()
        .filter(|e| e.message.chars().count() > MIN_CONTEXT_MESSAGE_CHARS)
        .map(|e| format!("- {}: {}", e.context, e.message))
        .collect();

    if lines.is_empty() {
        return None;
    }
    Some(format!("Previous conversation context:\n{}", lines.join("\n")))
}

fn favorite_tools_label(session: &UserSession) -> String {
    if session.favorite_tools.is_empty() {
        "Not specified".to_string()
    } else {
        session.favorite_tools.join(", ")
    }
}

fn interests_label(session: &UserSession) -> String {
    if session.interests().is_empty() {
        "General".to_string()
    } else {
        session.interests().join(", ")
    }
}

fn grounding_block(session: &UserSession) -> String {
    format!(
        "IMPORTANT: Adapt your answer to the user's '{}' level. Favorite tools: {}.\n\
         Interests: {}.\n\n\
         Based on the provided documents, give a complete and personalized answer.",
        session.expertise_level,
        favorite_tools_label(session),
        interests_label(session),
    )
}

fn user_context_block(session: &UserSession) -> String {
    format!(
        "User context:\n\
         - Experience level: {}\n\
         - Favorite tools: {}\n\
         - Areas of interest: {}\n\
         - Searches performed: {}\n\n\
         Personalize your answer to this user profile.",
        session.expertise_level,
        favorite_tools_label(session),
        interests_label(session),
        session.search_count,
    )
}
