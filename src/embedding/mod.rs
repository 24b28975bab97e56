//! Embedding infrastructure for intent resolution.
//!
//! A pluggable `EmbeddingProvider` turns text into vectors (TF-IDF today).
//! The `EmbeddingIndex` holds one vector per corpus pattern, partitioned by
//! category, and answers nearest-pattern queries by cosine similarity.
//! Built once at startup; read-only afterwards.

pub mod tfidf;

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::info;

use crate::corpus::{Category, CorpusStore};

/// A single embedding vector.
pub type Embedding = Vec<f32>;

/// Trait for embedding text into vectors.
///
/// The same provider must embed the corpus and the queries: a different
/// vocabulary or model at query time silently degrades match quality.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a text string into a vector.
    fn embed(&self, text: &str) -> Embedding;
    /// Dimensionality of the embedding space.
    fn dimensions(&self) -> usize;
}

/// Tag reported when nothing matches.
pub const UNKNOWN_TAG: &str = "unknown";

/// Result of a similarity search.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// Intent tag of the matched pattern.
    pub tag: String,
    /// Cosine similarity score in [-1.0, 1.0].
    pub score: f32,
}

impl MatchResult {
    pub fn unknown() -> Self {
        Self {
            tag: UNKNOWN_TAG.to_string(),
            score: 0.0,
        }
    }
}

/// Cosine similarity between two vectors.
///
/// Mismatched lengths, empty vectors and zero vectors score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// One embedded corpus pattern.
#[derive(Debug, Clone)]
pub struct EmbeddingEntry {
    pub category: Category,
    pub pattern: String,
    pub vector: Embedding,
    pub tag: String,
}

/// Pre-embedded corpus patterns, partitioned by category.
#[derive(Debug, Default)]
pub struct EmbeddingIndex {
    entries: HashMap<Category, Vec<EmbeddingEntry>>,
}

impl EmbeddingIndex {
    /// Embed every pattern of every record in the corpus.
    ///
    /// Produces exactly one entry per pattern, in record then pattern order.
    pub fn build(corpus: &CorpusStore, provider: &dyn EmbeddingProvider) -> Self {
        let mut entries = HashMap::new();
        for category in Category::ALL {
            let list: Vec<EmbeddingEntry> = corpus
                .records(category)
                .iter()
                .flat_map(|record| {
                    record.patterns.iter().map(move |pattern| (record, pattern))
                })
                .map(|(record, pattern)| EmbeddingEntry {
                    category,
                    pattern: pattern.clone(),
                    vector: provider.embed(pattern),
                    tag: record.tag.clone(),
                })
                .collect();
            info!("embedded {} patterns for '{category}'", list.len());
            entries.insert(category, list);
        }
        Self { entries }
    }

    /// Best-scoring pattern of `category`. The first entry wins on ties.
    ///
    /// An empty category yields `("unknown", 0.0)` without scoring anything.
    pub fn nearest(&self, query: &[f32], category: Category) -> MatchResult {
        let entries = self.entries(category);
        if entries.is_empty() {
            return MatchResult::unknown();
        }

        let mut best: Option<(&EmbeddingEntry, f32)> = None;
        for entry in entries {
            let score = cosine_similarity(query, &entry.vector);
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((entry, score));
            }
        }

        best.map(|(entry, score)| MatchResult {
            tag: entry.tag.clone(),
            score,
        })
        .unwrap_or_else(MatchResult::unknown)
    }

    /// Top K patterns of `category` by descending score (for debug logging).
    pub fn search_top_k(
        &self,
        query: &[f32],
        category: Category,
        k: usize,
    ) -> Vec<(MatchResult, &str)> {
        let mut results: Vec<(MatchResult, &str)> = self
            .entries(category)
            .iter()
            .map(|e| {
                (
                    MatchResult {
                        tag: e.tag.clone(),
                        score: cosine_similarity(query, &e.vector),
                    },
                    e.pattern.as_str(),
                )
            })
            .collect();

        results.sort_by(|a, b| b.0.score.partial_cmp(&a.0.score).unwrap_or(Ordering::Equal));
        results.truncate(k);
        results
    }

    /// Entries of one category.
    pub fn entries(&self, category: Category) -> &[EmbeddingEntry] {
        self.entries
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of entries in one category.
    pub fn len(&self, category: Category) -> usize {
        self.entries(category).len()
    }

    /// Whether the index holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.values().all(Vec::is_empty)
    }
}
