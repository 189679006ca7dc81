//! End-to-end flows through the design assistant with fake backends
//!
//! The embedder maps keywords to fixed vectors and the chat backend echoes a
//! canned answer, so retrieval and prompt assembly can be checked exactly.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

use design_mentor_agent::{
    AgentError, AskRequest, AssistantConfig, DesignAssistant, ProfileUpdate, SearchRequest,
    SessionStore,
};
use design_mentor_config::DomainTables;
use design_mentor_core::{Embedder, Error, ExpertiseLevel, Passage};
use design_mentor_llm::{ChatBackend, GenerationResult, LlmError, Message};
use design_mentor_rag::{FillConfig, HistoryConfig, PassageStore, SearchHistory};

struct KeywordEmbedder;

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> design_mentor_core::Result<Vec<f32>> {
        let text = text.to_lowercase();
        if text.contains("offline") {
            return Err(Error::UpstreamUnavailable("embedding endpoint down".to_string()));
        }
        if text.contains("color") {
            Ok(vec![1.0, 0.0])
        } else if text.contains("grid") {
            Ok(vec![0.0, 1.0])
        } else {
            Ok(vec![0.5, 0.5])
        }
    }

    fn dimensions(&self) -> usize {
        2
    }
}

/// Canned answer; optionally parks inside `generate` until released
#[derive(Default)]
struct CannedBackend {
    gated: bool,
    entered: Notify,
    release: Notify,
    prompts: Mutex<Vec<String>>,
}

impl CannedBackend {
    fn gated() -> Self {
        Self {
            gated: true,
            ..Default::default()
        }
    }

    fn last_prompt(&self) -> String {
        self.prompts.lock().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl ChatBackend for CannedBackend {
    async fn generate(&self, messages: &[Message]) -> Result<GenerationResult, LlmError> {
        self.prompts.lock().push(messages[1].content.clone());
        if self.gated {
            self.entered.notify_one();
            self.release.notified().await;
        }
        Ok(GenerationResult {
            text: "Canned design answer.".to_string(),
            tokens: 4,
            total_time_ms: 1,
            finish_reason: Some("stop".to_string()),
        })
    }

    fn model_name(&self) -> &str {
        "canned"
    }
}

fn corpus() -> Vec<Passage> {
    vec![
        Passage::new("c1", "Color_Guide.pdf", vec![2], "Contrast ratio of 4.5:1 for body text.")
            .with_embedding(vec![1.0, 0.0]),
        Passage::new("g1", "Layout.pdf", vec![7, 8], "Use an 8pt baseline grid.")
            .with_embedding(vec![0.0, 1.0]),
        Passage::new("t1", "Type.pdf", vec![1], "Pair a serif with a sans."),
    ]
}

fn assistant_with(
    dir: &Path,
    passages: Vec<Passage>,
    backend: Arc<CannedBackend>,
) -> (Arc<DesignAssistant>, Arc<PassageStore>) {
    let tables = Arc::new(DomainTables::default());
    let sessions = Arc::new(SessionStore::open(dir.join("user_sessions.json")));
    let history = Arc::new(SearchHistory::open(
        dir.join("search_history.json"),
        HistoryConfig::default(),
        tables.clone(),
    ));
    let store = Arc::new(PassageStore::from_passages(passages));
    let config = AssistantConfig {
        top_k: 1,
        fill: FillConfig {
            concurrency: 3,
            pacing: Duration::ZERO,
        },
    };

    let assistant = DesignAssistant::new(
        tables,
        sessions,
        store.clone(),
        history,
        Arc::new(KeywordEmbedder),
        backend,
        config,
    );
    (Arc::new(assistant), store)
}

fn search(user_id: &str, query: &str) -> SearchRequest {
    SearchRequest {
        user_id: user_id.to_string(),
        query: query.to_string(),
        filters: Default::default(),
    }
}

fn ask(user_id: &str, question: &str, command: &str) -> AskRequest {
    AskRequest {
        user_id: user_id.to_string(),
        question: question.to_string(),
        command_type: command.to_string(),
    }
}

#[tokio::test]
async fn test_fill_then_grounded_search() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(CannedBackend::default());
    let (assistant, store) = assistant_with(dir.path(), corpus(), backend.clone());

    let report = assistant.fill_embeddings().await.unwrap();
    assert_eq!(report.generated, 1);
    assert_eq!(report.already_embedded, 2);
    assert_eq!(store.embedded_count(), 3);

    let result = assistant.search(&search("u1", "color contrast")).await.unwrap();
    assert!(result.answer.starts_with("Canned design answer."));
    assert!(result.answer.contains("💡 **Professional tip:**"));
    assert_eq!(result.references, vec!["📄 Color Guide | 📌 p. 2".to_string()]);
    assert!(result.expanded_query.starts_with("color contrast"));

    let prompt = backend.last_prompt();
    assert!(prompt.contains("📚 Resource: Color Guide"));
    assert!(!prompt.contains("Layout"));

    let session = assistant.session("u1");
    assert_eq!(session.search_count, 1);
    assert_eq!(session.last_search.as_deref(), Some("color contrast"));
    assert_eq!(session.current_context, "search");
}

#[tokio::test]
async fn test_ask_uses_profile_and_history() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(CannedBackend::default());
    let (assistant, _) = assistant_with(dir.path(), corpus(), backend.clone());

    let update = ProfileUpdate {
        expertise_level: Some("beginner".to_string()),
        toggle_tools: vec!["Figma".to_string()],
        ..Default::default()
    };
    assistant.update_profile("u1", &update).unwrap();

    let result = assistant
        .ask(&ask("u1", "how do I start with auto layout in figma?", "tools"))
        .await
        .unwrap();
    assert!(result.references.is_empty());
    assert!(result.answer.starts_with("Canned design answer."));
    assert!(result.answer.contains("💡 **Figma tip:**"));
    assert!(result.answer.contains("🌱 **Next step:**"));

    let prompt = backend.last_prompt();
    assert!(prompt.contains("As a guide for beginners in Figma"));
    assert!(prompt.contains("- Searches performed: 0"));

    let session = assistant.session("u1");
    let last = session.conversation_history.last().unwrap();
    assert_eq!(last.context, "question_tools");
    assert_eq!(last.message, "how do I start with auto layout in figma?");
}

#[tokio::test]
async fn test_search_degrades_to_messages() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(CannedBackend::default());

    let (empty, _) = assistant_with(dir.path(), Vec::new(), backend.clone());
    let result = empty.search(&search("u1", "color")).await.unwrap();
    assert!(result.answer.contains("No processed documents"));
    assert!(result.references.is_empty());

    let (assistant, _) = assistant_with(dir.path(), corpus(), backend.clone());
    let result = assistant.search(&search("u2", "offline color")).await.unwrap();
    assert!(result.answer.contains("could not process your query"));

    // neither path reached the chat backend
    assert!(backend.prompts.lock().is_empty());
}

#[tokio::test]
async fn test_invalid_input_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (assistant, _) = assistant_with(dir.path(), corpus(), Arc::new(CannedBackend::default()));

    let err = assistant.ask(&ask("u1", "   ", "design")).await.unwrap_err();
    assert!(matches!(err, AgentError::InvalidInput(_)));

    let err = assistant.search(&search("", "grids")).await.unwrap_err();
    assert!(matches!(err, AgentError::InvalidInput(_)));

    let update = ProfileUpdate {
        expertise_level: Some("guru".to_string()),
        toggle_tools: vec!["Figma".to_string()],
        ..Default::default()
    };
    let err = assistant.update_profile("u1", &update).unwrap_err();
    assert!(matches!(err, AgentError::InvalidInput(_)));
    // rejected edits change nothing
    assert!(assistant.session("u1").favorite_tools.is_empty());
}

#[tokio::test]
async fn test_concurrent_request_for_same_user_is_busy() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(CannedBackend::gated());
    let (assistant, _) = assistant_with(dir.path(), corpus(), backend.clone());

    let first = {
        let assistant = assistant.clone();
        tokio::spawn(async move { assistant.ask(&ask("u1", "what is a design token?", "ui")).await })
    };
    backend.entered.notified().await;
    assert!(assistant.is_processing("u1"));

    let err = assistant
        .search(&search("u1", "grid systems"))
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::Busy { ref user_id } if user_id == "u1"));

    // a different user is not blocked by u1
    assert!(!assistant.is_processing("u2"));

    backend.release.notify_one();
    let answer = first.await.unwrap().unwrap();
    assert!(answer.answer.starts_with("Canned design answer."));
    assert!(!assistant.is_processing("u1"));
}

#[tokio::test]
async fn test_state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let (assistant, _) =
            assistant_with(dir.path(), corpus(), Arc::new(CannedBackend::default()));
        let update = ProfileUpdate {
            expertise_level: Some("expert".to_string()),
            response_style: Some("practical".to_string()),
            toggle_interests: vec!["Design Systems".to_string()],
            onboarding_completed: Some(true),
            ..Default::default()
        };
        assistant.update_profile("u1", &update).unwrap();
        assistant.search(&search("u1", "grid layouts")).await.unwrap();
        assistant.search(&search("u1", "grid layouts")).await.unwrap();
        assistant.flush();
    }

    let (assistant, _) = assistant_with(dir.path(), corpus(), Arc::new(CannedBackend::default()));
    let session = assistant.session("u1");
    assert_eq!(session.expertise_level, ExpertiseLevel::Expert);
    assert_eq!(session.preferences.response_style, "practical");
    assert!(session.preferences.onboarding_completed);
    assert_eq!(session.search_count, 2);

    assert_eq!(assistant.trending(), vec!["grid layouts".to_string()]);
    let suggestions = assistant.suggestions("u1", "grid");
    assert_eq!(suggestions.first().map(String::as_str), Some("🔍 grid"));

    let previews = assistant.preview("tokens", "ui", "u1");
    assert_eq!(previews.len(), 3);
    assert!(!assistant.tips("u1").is_empty());
    assert_eq!(assistant.analytics("u1").searches_count, 2);
}
