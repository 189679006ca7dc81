//! Corpus passage type

use serde::{Deserialize, Serialize};

/// A chunk of corpus text with its source metadata and optional embedding
///
/// Passages are produced by corpus ingestion and never change afterwards,
/// except for the embedding which is attached once by the batch fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    /// Stable passage identifier
    pub id: String,
    /// Source document path or file name
    #[serde(alias = "document")]
    pub document_name: String,
    /// Pages of the source document this passage spans
    #[serde(default, alias = "pages")]
    pub page_numbers: Vec<u32>,
    /// Passage text
    #[serde(default)]
    pub text: String,
    /// Embedding vector, absent until filled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Passage {
    /// Create an unembedded passage
    pub fn new(
        id: impl Into<String>,
        document_name: impl Into<String>,
        page_numbers: Vec<u32>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            document_name: document_name.into(),
            page_numbers,
            text: text.into(),
            embedding: None,
        }
    }

    /// Builder-style embedding assignment
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    pub fn is_embedded(&self) -> bool {
        self.embedding.as_ref().is_some_and(|e| !e.is_empty())
    }

    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Has the minimum fields required to ground an answer
    pub fn is_complete(&self) -> bool {
        !self.document_name.trim().is_empty() && self.has_text()
    }

    /// Human-readable document name
    ///
    /// Takes the file name component, strips a `.pdf` extension and turns
    /// underscores into spaces: `docs/Design_Systems_101.pdf` becomes
    /// `Design Systems 101`.
    pub fn display_name(&self) -> String {
        let base = self
            .document_name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.document_name);
        let stem = base
            .strip_suffix(".pdf")
            .or_else(|| base.strip_suffix(".PDF"))
            .unwrap_or(base);
        stem.replace('_', " ")
    }

    /// Page list joined with ", ", or "N/A" when unknown
    pub fn pages_label(&self) -> String {
        if self.page_numbers.is_empty() {
            return "N/A".to_string();
        }
        self.page_numbers
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        let p = Passage::new("1", "corpus/Design_Systems_101.pdf", vec![], "x");
        assert_eq!(p.display_name(), "Design Systems 101");

        let p = Passage::new("2", "C:\\docs\\Atomic_Design.pdf", vec![], "x");
        assert_eq!(p.display_name(), "Atomic Design");

        let p = Passage::new("3", "notes_on_ux.md", vec![], "x");
        assert_eq!(p.display_name(), "notes on ux.md");
    }

    #[test]
    fn test_pages_label() {
        let p = Passage::new("1", "a.pdf", vec![3, 4, 10], "x");
        assert_eq!(p.pages_label(), "3, 4, 10");

        let p = Passage::new("1", "a.pdf", vec![], "x");
        assert_eq!(p.pages_label(), "N/A");
    }

    #[test]
    fn test_completeness() {
        assert!(Passage::new("1", "a.pdf", vec![1], "text").is_complete());
        assert!(!Passage::new("1", "", vec![1], "text").is_complete());
        assert!(!Passage::new("1", "a.pdf", vec![1], "   ").is_complete());
    }

    #[test]
    fn test_embedding_state() {
        let p = Passage::new("1", "a.pdf", vec![1], "text");
        assert!(!p.is_embedded());
        assert!(p.clone().with_embedding(vec![0.1, 0.2]).is_embedded());
        assert!(!p.with_embedding(vec![]).is_embedded());
    }

    #[test]
    fn test_deserialize_legacy_field_names() {
        let json = r#"{"id":"c1","document":"guide.pdf","pages":[2],"text":"hello"}"#;
        let p: Passage = serde_json::from_str(json).unwrap();
        assert_eq!(p.document_name, "guide.pdf");
        assert_eq!(p.page_numbers, vec![2]);
        assert!(p.embedding.is_none());
    }
}
