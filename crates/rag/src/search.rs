//! Exact nearest-neighbour search over embedded passages
//!
//! A linear scan is enough for a corpus of a few thousand passages. Passages
//! without an embedding, or with a dimension different from the query, are
//! never candidates.

use serde::Serialize;

use design_mentor_core::Passage;

/// A passage paired with its distance to the query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match<'a> {
    pub passage: &'a Passage,
    pub distance: f32,
}

impl Match<'_> {
    pub fn to_scored(&self) -> ScoredPassage {
        ScoredPassage {
            passage: self.passage.clone(),
            distance: self.distance,
        }
    }
}

/// Owned search hit, for callers that outlive the corpus borrow
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredPassage {
    pub passage: Passage,
    pub distance: f32,
}

/// L2 distance between equal-length vectors
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum::<f32>()
        .sqrt()
}

fn score<'a>(query: &[f32], passage: &'a Passage) -> Option<Match<'a>> {
    let embedding = passage.embedding.as_deref()?;
    if embedding.len() != query.len() {
        return None;
    }
    Some(Match {
        passage,
        distance: euclidean_distance(query, embedding),
    })
}

/// The `k` closest passages, ascending by distance
///
/// Equal distances keep corpus order.
pub fn search<'a>(query: &[f32], corpus: &'a [Passage], k: usize) -> Vec<Match<'a>> {
    if k == 0 || query.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<Match<'a>> = corpus.iter().filter_map(|p| score(query, p)).collect();
    // stable: ties stay in corpus order
    matches.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    matches.truncate(k);
    matches
}

/// The single closest passage; the first one wins an exact tie
pub fn nearest<'a>(vector: &[f32], corpus: &'a [Passage]) -> Option<Match<'a>> {
    if vector.is_empty() {
        return None;
    }

    let mut best: Option<Match<'a>> = None;
    for candidate in corpus.iter().filter_map(|p| score(vector, p)) {
        match best {
            Some(ref current) if candidate.distance >= current.distance => {}
            _ => best = Some(candidate),
        }
    }
    best
}

/// Map raw context vectors back to the passages they were computed from
pub fn resolve_vectors(vectors: &[Vec<f32>], corpus: &[Passage]) -> Vec<Passage> {
    vectors
        .iter()
        .filter_map(|v| nearest(v, corpus).map(|m| m.passage.clone()))
        .collect()
}
