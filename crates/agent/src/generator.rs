//! Answer generation over the chat backend
//!
//! Two modes share one contract: the caller always gets displayable text.
//! Upstream failures and blank completions are turned into user-facing
//! messages here, never propagated as errors.

use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

use design_mentor_config::DomainTables;
use design_mentor_core::Passage;
use design_mentor_llm::{ChatBackend, LlmError, Message};
use design_mentor_rag::resolve_vectors;

/// Returned when no usable passage is left to ground an answer on
pub const NO_RELEVANT_RESOURCES: &str =
    "No relevant design resources were found to answer your question.";

/// Returned when the completion comes back blank
pub const EMPTY_GENERATION_FALLBACK: &str =
    "I could not generate a suitable answer. Try rephrasing your question.";

const ERROR_PREFIX: &str = "⚠️ Error generating an answer for your design question: ";
const RESOURCE_SEPARATOR: &str = "――――――――――――――――――――――";

const GROUNDED_SYSTEM: &str = "You are an expert UX/UI designer and user experience consultant. \
You answer professionally and practically, with concrete examples from real-world digital design.";

const GENERAL_SYSTEM: &str = "You are an expert UX/UI designer and mentor. \
You answer with deep knowledge of user experience, interfaces, usability, accessibility and modern design tools.";

/// Answer text with the references it was grounded on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroundedAnswer {
    pub answer: String,
    pub references: Vec<String>,
}

impl GroundedAnswer {
    fn unreferenced(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            references: Vec::new(),
        }
    }
}

/// Produces grounded and general answers
pub struct AnswerGenerator {
    backend: Arc<dyn ChatBackend>,
    tables: Arc<DomainTables>,
}

impl AnswerGenerator {
    pub fn new(backend: Arc<dyn ChatBackend>, tables: Arc<DomainTables>) -> Self {
        Self { backend, tables }
    }

    pub fn model_name(&self) -> &str {
        self.backend.model_name()
    }

    /// Answer from retrieved passages
    pub async fn generate_grounded(&self, prompt: &str, passages: &[Passage]) -> GroundedAnswer {
        let usable: Vec<&Passage> = passages.iter().filter(|p| p.is_complete()).collect();
        if usable.is_empty() {
            tracing::debug!(supplied = passages.len(), "No usable passages to ground on");
            return GroundedAnswer::unreferenced(NO_RELEVANT_RESOURCES);
        }

        let messages = [
            Message::system(GROUNDED_SYSTEM),
            Message::user(grounded_user_message(prompt, &usable)),
        ];

        match self.complete(&messages).await {
            Ok(Some(text)) => GroundedAnswer {
                answer: self.with_closing_tip(text),
                references: references(&usable),
            },
            Ok(None) => GroundedAnswer::unreferenced(EMPTY_GENERATION_FALLBACK),
            Err(e) => GroundedAnswer::unreferenced(error_content(&e)),
        }
    }

    /// Answer from general design knowledge
    pub async fn generate_general(&self, prompt: &str) -> String {
        let messages = [
            Message::system(GENERAL_SYSTEM),
            Message::user(general_user_message(prompt)),
        ];

        match self.complete(&messages).await {
            Ok(Some(text)) => self.with_closing_tip(text),
            Ok(None) => EMPTY_GENERATION_FALLBACK.to_string(),
            Err(e) => error_content(&e),
        }
    }

    /// Grounded answer when the context arrives as bare vectors
    pub async fn generate_from_vectors(
        &self,
        prompt: &str,
        vectors: &[Vec<f32>],
        corpus: &[Passage],
    ) -> GroundedAnswer {
        let passages = resolve_vectors(vectors, corpus);
        self.generate_grounded(prompt, &passages).await
    }

    /// `None` for a blank completion
    async fn complete(&self, messages: &[Message]) -> Result<Option<String>, LlmError> {
        let result = self.backend.generate(messages).await.map_err(|e| {
            tracing::error!(error = %e, model = self.backend.model_name(), "Answer generation failed");
            e
        })?;

        tracing::info!(
            tokens = result.tokens,
            time_ms = result.total_time_ms,
            finish_reason = ?result.finish_reason,
            "Generated answer"
        );

        if result.text.trim().is_empty() {
            tracing::warn!("Blank completion from chat endpoint");
            return Ok(None);
        }
        Ok(Some(result.text))
    }

    fn with_closing_tip(&self, mut text: String) -> String {
        text.push_str("\n\n");
        text.push_str(&self.tables.adaptation.closing_tip);
        text
    }
}

fn error_content(err: &LlmError) -> String {
    format!("{}{}", ERROR_PREFIX, err)
}

fn context_block(passages: &[&Passage]) -> String {
    passages
        .iter()
        .map(|p| {
            format!(
                "\n\n📚 Resource: {}\n📖 Pages: {}\n📝 Content:\n{}\n{}",
                p.display_name(),
                p.pages_label(),
                p.text,
                RESOURCE_SEPARATOR
            )
        })
        .collect()
}

fn grounded_user_message(prompt: &str, passages: &[&Passage]) -> String {
    format!(
        "You are a senior UX/UI Design expert with more than 10 years of experience. \
         You answer with deep knowledge of user research, interface design, usability, \
         accessibility, design systems and best practices. \
         QUESTION: {}\n\n\
         RELEVANT DESIGN RESOURCES:\n{}\n\n\
         Based on the information above and your design experience, give a professional and practical answer. \
         Include concrete examples, best practices and important considerations. \
         Structure your answer with Markdown headings where appropriate. \
         When relevant, mention specific tools such as Figma, Sketch or Adobe XD.\n\n\
         ANSWER:",
        prompt,
        context_block(passages)
    )
}

fn general_user_message(prompt: &str) -> String {
    format!(
        "As a senior UX/UI Design expert, answer in a detailed and practical way:\n\
         Question: {}\n\n\
         Include when relevant:\n\
         - Fundamental design principles\n\
         - UX/UI best practices\n\
         - Recommended tools (Figma, Sketch, Adobe XD, etc.)\n\
         - Real-world examples\n\
         - Usability and accessibility considerations\n\
         - Current design trends\n\
         Professional answer (markdown format):",
        prompt
    )
}

/// One reference per distinct (document, pages) pair, in first-seen order
fn references(passages: &[&Passage]) -> Vec<String> {
    let mut seen: HashSet<(&str, &[u32])> = HashSet::new();
    let mut refs = Vec::new();
    for &passage in passages {
        if seen.insert((passage.document_name.as_str(), passage.page_numbers.as_slice())) {
            refs.push(format!("📄 {} | 📌 p. {}", passage.display_name(), passage.pages_label()));
        }
    }
    refs
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use design_mentor_llm::GenerationResult;
    use parking_lot::Mutex;

    /// Replies with a fixed outcome and records what it was sent
    struct ScriptedBackend {
        reply: Result<String, fn() -> LlmError>,
        seen: Mutex<Vec<Vec<Message>>>,
    }

    impl ScriptedBackend {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing(err: fn() -> LlmError) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(err),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.seen.lock().len()
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn generate(&self, messages: &[Message]) -> Result<GenerationResult, LlmError> {
            self.seen.lock().push(messages.to_vec());
            match &self.reply {
                Ok(text) => Ok(GenerationResult {
                    text: text.clone(),
                    tokens: 12,
                    total_time_ms: 5,
                    finish_reason: Some("stop".to_string()),
                }),
                Err(make) => Err(make()),
            }
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    fn generator(backend: Arc<ScriptedBackend>) -> AnswerGenerator {
        AnswerGenerator::new(backend, Arc::new(DomainTables::default()))
    }

    fn passages() -> Vec<Passage> {
        vec![
            Passage::new("p1", "docs/Design_Systems.pdf", vec![4, 5], "Tokens encode decisions."),
            Passage::new("p2", "docs/Design_Systems.pdf", vec![4, 5], "Components reuse tokens."),
            Passage::new("p3", "Color.pdf", vec![], "Contrast ratios matter."),
            Passage::new("p4", "Empty.pdf", vec![1], "   "),
        ]
    }

    #[tokio::test]
    async fn test_grounded_answer_with_references() {
        let backend = ScriptedBackend::replying("Use tokens.");
        let generator = generator(backend.clone());

        let result = generator.generate_grounded("design tokens", &passages()).await;
        assert!(result.answer.starts_with("Use tokens.\n\n💡 **Professional tip:**"));
        assert_eq!(
            result.references,
            vec![
                "📄 Design Systems | 📌 p. 4, 5".to_string(),
                "📄 Color | 📌 p. N/A".to_string(),
            ]
        );

        let seen = backend.seen.lock();
        let user = &seen[0][1].content;
        assert!(user.contains("QUESTION: design tokens"));
        assert!(user.contains("📚 Resource: Design Systems\n📖 Pages: 4, 5\n📝 Content:\nTokens encode decisions."));
        // the blank passage is not sent
        assert!(!user.contains("Empty"));
        assert!(user.ends_with("ANSWER:"));
    }

    #[tokio::test]
    async fn test_no_usable_passages_skips_backend() {
        let backend = ScriptedBackend::replying("unused");
        let generator = generator(backend.clone());

        let blank = vec![Passage::new("p", "a.pdf", vec![1], "")];
        let result = generator.generate_grounded("q", &blank).await;
        assert_eq!(result.answer, NO_RELEVANT_RESOURCES);
        assert!(result.references.is_empty());
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_passage_list_skips_backend() {
        let backend = ScriptedBackend::replying("unused");
        let generator = generator(backend.clone());

        let result = generator.generate_grounded("q", &[]).await;
        assert_eq!(result.answer, NO_RELEVANT_RESOURCES);
        assert!(result.references.is_empty());
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_references_keep_same_named_documents_apart() {
        let generator = generator(ScriptedBackend::replying("Both guides agree."));
        let corpus = vec![
            Passage::new("a", "web/Guide.pdf", vec![2], "Spacing scale."),
            Passage::new("b", "mobile/Guide.pdf", vec![2], "Touch targets."),
            Passage::new("c", "web/Guide.pdf", vec![2], "Type scale."),
        ];

        let result = generator.generate_grounded("guides", &corpus).await;
        assert_eq!(
            result.references,
            vec![
                "📄 Guide | 📌 p. 2".to_string(),
                "📄 Guide | 📌 p. 2".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_blank_completion_falls_back() {
        let generator = generator(ScriptedBackend::replying("  \n"));
        let result = generator.generate_grounded("q", &passages()).await;
        assert_eq!(result.answer, EMPTY_GENERATION_FALLBACK);
        assert!(result.references.is_empty());

        assert_eq!(generator.generate_general("q").await, EMPTY_GENERATION_FALLBACK);
    }

    #[tokio::test]
    async fn test_failure_becomes_content() {
        let generator = generator(ScriptedBackend::failing(|| LlmError::Timeout));
        let result = generator.generate_grounded("q", &passages()).await;
        assert!(result.answer.starts_with(ERROR_PREFIX));
        assert!(result.references.is_empty());

        let answer = generator.generate_general("q").await;
        assert!(answer.starts_with(ERROR_PREFIX));
    }

    #[tokio::test]
    async fn test_general_answer() {
        let backend = ScriptedBackend::replying("Start with research.");
        let generator = generator(backend.clone());

        let answer = generator.generate_general("how do I start?").await;
        assert!(answer.starts_with("Start with research.\n\n"));
        assert!(answer.ends_with("usability data."));

        let seen = backend.seen.lock();
        assert!(seen[0][0].content.contains("mentor"));
        assert!(seen[0][1].content.contains("Question: how do I start?"));
    }

    #[tokio::test]
    async fn test_generate_from_vectors() {
        let backend = ScriptedBackend::replying("Answer.");
        let generator = generator(backend.clone());
        let corpus = vec![
            Passage::new("a", "A.pdf", vec![1], "alpha").with_embedding(vec![0.0, 0.0]),
            Passage::new("b", "B.pdf", vec![2], "beta").with_embedding(vec![5.0, 5.0]),
        ];

        let result = generator
            .generate_from_vectors("q", &[vec![4.0, 4.5]], &corpus)
            .await;
        assert_eq!(result.references, vec!["📄 B | 📌 p. 2".to_string()]);
    }
}
