//! Passage corpus and batch embedding fill
//!
//! The store owns the corpus loaded from `passages.json`. Passages missing an
//! embedding are filled once at startup through [`fill_missing_embeddings`]:
//! - already-embedded passages are skipped
//! - passages without text are logged and never sent upstream
//! - at most `concurrency` calls run at once, with a pacing delay after each
//! - a failed call leaves its passage unembedded and is only counted

use futures::stream::{self, StreamExt};
use parking_lot::{Mutex, RwLock};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use design_mentor_config::constants::retrieval;
use design_mentor_config::EmbeddingSettings;
use design_mentor_core::storage::{read_json_or_default, write_json_atomic};
use design_mentor_core::{Embedder, Passage};

use crate::search::{self, ScoredPassage};
use crate::RagError;

/// Batch fill configuration
#[derive(Debug, Clone)]
pub struct FillConfig {
    /// Embedding calls in flight
    pub concurrency: usize,
    /// Delay after each completed call
    pub pacing: Duration,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            concurrency: retrieval::FILL_CONCURRENCY,
            pacing: Duration::from_millis(retrieval::FILL_PACING_MS),
        }
    }
}

impl FillConfig {
    pub fn from_settings(settings: &EmbeddingSettings) -> Self {
        Self {
            concurrency: settings.fill_concurrency,
            pacing: Duration::from_millis(settings.fill_pacing_ms),
        }
    }
}

/// Outcome of a batch fill
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FillReport {
    pub requested: usize,
    pub already_embedded: usize,
    pub generated: usize,
    pub failed: usize,
    pub skipped_no_text: usize,
    pub elapsed: Duration,
}

impl FillReport {
    /// Whether there was nothing to embed
    pub fn is_noop(&self) -> bool {
        self.generated == 0 && self.failed == 0
    }
}

/// Embed every passage that lacks an embedding, in place
pub async fn fill_missing_embeddings(
    passages: &mut [Passage],
    embedder: &dyn Embedder,
    config: &FillConfig,
) -> FillReport {
    let start = Instant::now();
    let mut report = FillReport {
        requested: passages.len(),
        ..Default::default()
    };

    let mut pending = Vec::new();
    for (idx, passage) in passages.iter().enumerate() {
        if passage.is_embedded() {
            report.already_embedded += 1;
        } else if !passage.has_text() {
            tracing::warn!(passage_id = %passage.id, "Passage has no text, not embedding it");
            report.skipped_no_text += 1;
        } else {
            pending.push(idx);
        }
    }

    if pending.is_empty() {
        report.elapsed = start.elapsed();
        tracing::info!(
            total = report.requested,
            already_embedded = report.already_embedded,
            "All passages already embedded, nothing to do"
        );
        return report;
    }

    tracing::info!(
        pending = pending.len(),
        concurrency = config.concurrency,
        "Generating missing embeddings"
    );

    let corpus: &[Passage] = &*passages;
    let pacing = config.pacing;
    let outcomes: Vec<(usize, design_mentor_core::Result<Vec<f32>>)> = stream::iter(pending)
        .map(|idx| async move {
            let outcome = embedder.embed(&corpus[idx].text).await;
            tokio::time::sleep(pacing).await;
            (idx, outcome)
        })
        .buffer_unordered(config.concurrency.max(1))
        .collect()
        .await;

    for (idx, outcome) in outcomes {
        match outcome {
            Ok(vector) => {
                passages[idx].embedding = Some(vector);
                report.generated += 1;
            }
            Err(e) => {
                tracing::warn!(passage_id = %passages[idx].id, error = %e, "Embedding failed");
                report.failed += 1;
            }
        }
    }

    report.elapsed = start.elapsed();
    let attempted = report.generated + report.failed;
    tracing::info!(
        generated = report.generated,
        failed = report.failed,
        elapsed_ms = report.elapsed.as_millis() as u64,
        avg_ms_per_item = report.elapsed.as_millis() as u64 / attempted.max(1) as u64,
        "Embedding fill finished"
    );

    report
}

/// In-memory corpus backed by a JSON file
pub struct PassageStore {
    path: Option<PathBuf>,
    passages: RwLock<Vec<Passage>>,
    /// Serializes fill-and-save
    write_lock: Mutex<()>,
}

impl PassageStore {
    /// Load the corpus; a missing file yields an empty corpus
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RagError> {
        let path = path.as_ref().to_path_buf();
        let passages: Vec<Passage> = read_json_or_default(&path)?;
        tracing::info!(
            path = %path.display(),
            passages = passages.len(),
            embedded = passages.iter().filter(|p| p.is_embedded()).count(),
            "Loaded passage corpus"
        );
        Ok(Self {
            path: Some(path),
            passages: RwLock::new(passages),
            write_lock: Mutex::new(()),
        })
    }

    /// Store without a backing file
    pub fn from_passages(passages: Vec<Passage>) -> Self {
        Self {
            path: None,
            passages: RwLock::new(passages),
            write_lock: Mutex::new(()),
        }
    }

    pub fn len(&self) -> usize {
        self.passages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.read().is_empty()
    }

    pub fn embedded_count(&self) -> usize {
        self.passages.read().iter().filter(|p| p.is_embedded()).count()
    }

    pub fn snapshot(&self) -> Vec<Passage> {
        self.passages.read().clone()
    }

    /// Persist the corpus, if the store has a backing file
    pub fn save(&self) -> Result<(), RagError> {
        let Some(ref path) = self.path else {
            return Ok(());
        };
        let _guard = self.write_lock.lock();
        let snapshot = self.passages.read().clone();
        write_json_atomic(path, &snapshot)?;
        Ok(())
    }

    /// Fill missing embeddings for the stored corpus, then persist
    pub async fn fill(&self, embedder: &dyn Embedder, config: &FillConfig) -> Result<FillReport, RagError> {
        let mut working = self.snapshot();
        let report = fill_missing_embeddings(&mut working, embedder, config).await;

        if report.generated > 0 {
            *self.passages.write() = working;
            self.save()?;
        }
        Ok(report)
    }

    /// The `k` closest embedded passages to `query`
    pub fn search(&self, query: &[f32], k: usize) -> Vec<ScoredPassage> {
        let passages = self.passages.read();
        search::search(query, &passages, k)
            .iter()
            .map(|m| m.to_scored())
            .collect()
    }

    /// The closest embedded passage to `vector`
    pub fn nearest(&self, vector: &[f32]) -> Option<ScoredPassage> {
        let passages = self.passages.read();
        search::nearest(vector, &passages).map(|m| m.to_scored())
    }

    /// Passages whose embeddings are closest to each of `vectors`
    pub fn resolve_vectors(&self, vectors: &[Vec<f32>]) -> Vec<Passage> {
        search::resolve_vectors(vectors, &self.passages.read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Embeds text as `[len, 0]`; fails on texts containing "fail"
    struct LengthEmbedder {
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl LengthEmbedder {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Embedder for LengthEmbedder {
        async fn embed(&self, text: &str) -> design_mentor_core::Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if text.contains("fail") {
                return Err(design_mentor_core::Error::UpstreamUnavailable("down".into()));
            }
            Ok(vec![text.len() as f32, 0.0])
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    fn fast() -> FillConfig {
        FillConfig {
            concurrency: 3,
            pacing: Duration::from_millis(1),
        }
    }

    fn corpus() -> Vec<Passage> {
        vec![
            Passage::new("1", "a.pdf", vec![1], "grids").with_embedding(vec![1.0, 1.0]),
            Passage::new("2", "a.pdf", vec![2], ""),
            Passage::new("3", "b.pdf", vec![3], "typography"),
            Passage::new("4", "b.pdf", vec![4], "this will fail"),
            Passage::new("5", "c.pdf", vec![5], "color"),
            Passage::new("6", "c.pdf", vec![6], "spacing"),
            Passage::new("7", "c.pdf", vec![7], "layout"),
        ]
    }

    #[tokio::test]
    async fn test_fill_counts_and_assigns() {
        let embedder = LengthEmbedder::new();
        let mut passages = corpus();
        let report = fill_missing_embeddings(&mut passages, &embedder, &fast()).await;

        assert_eq!(report.requested, 7);
        assert_eq!(report.already_embedded, 1);
        assert_eq!(report.skipped_no_text, 1);
        assert_eq!(report.generated, 4);
        assert_eq!(report.failed, 1);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 5);

        assert_eq!(passages[0].embedding, Some(vec![1.0, 1.0]));
        assert!(passages[1].embedding.is_none());
        assert_eq!(passages[2].embedding, Some(vec![10.0, 0.0]));
        assert!(passages[3].embedding.is_none());
    }

    #[tokio::test]
    async fn test_fill_respects_concurrency() {
        let embedder = LengthEmbedder::new();
        let mut passages: Vec<Passage> = (0..12)
            .map(|i| Passage::new(i.to_string(), "d.pdf", vec![], format!("text {}", i)))
            .collect();
        fill_missing_embeddings(&mut passages, &embedder, &fast()).await;
        assert!(embedder.max_in_flight.load(Ordering::SeqCst) <= 3);
        assert!(passages.iter().all(|p| p.is_embedded()));
    }

    #[tokio::test]
    async fn test_fill_is_idempotent() {
        let embedder = LengthEmbedder::new();
        let mut passages = vec![Passage::new("1", "a.pdf", vec![], "grids")];
        fill_missing_embeddings(&mut passages, &embedder, &fast()).await;
        let second = fill_missing_embeddings(&mut passages, &embedder, &fast()).await;

        assert!(second.is_noop());
        assert_eq!(second.already_embedded, 1);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_store_fill_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("passages.json");
        std::fs::write(&path, serde_json::to_vec(&corpus()).unwrap()).unwrap();

        let store = PassageStore::load(&path).unwrap();
        assert_eq!(store.len(), 7);
        assert_eq!(store.embedded_count(), 1);

        let report = store.fill(&LengthEmbedder::new(), &fast()).await.unwrap();
        assert_eq!(report.generated, 4);
        assert_eq!(store.embedded_count(), 5);

        let reloaded = PassageStore::load(&path).unwrap();
        assert_eq!(reloaded.embedded_count(), 5);
    }

    #[test]
    fn test_missing_file_is_empty_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let store = PassageStore::load(dir.path().join("absent.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_search() {
        let store = PassageStore::from_passages(vec![
            Passage::new("a", "a.pdf", vec![], "x").with_embedding(vec![5.0, 0.0]),
            Passage::new("b", "b.pdf", vec![], "y").with_embedding(vec![1.0, 0.0]),
        ]);
        let hits = store.search(&[0.0, 0.0], 5);
        assert_eq!(hits[0].passage.id, "b");
        assert_eq!(store.nearest(&[4.0, 0.0]).unwrap().passage.id, "a");
        assert_eq!(store.resolve_vectors(&[vec![0.9, 0.0]])[0].id, "b");
    }
}
