//! Intent routing — from a free-text utterance to a response.
//!
//! The resolver embeds the utterance and picks the nearest corpus pattern of
//! the requested category. The selector then forks between weather,
//! product recommendation, intent replies and the rephrase fallback.

pub mod predicates;
pub mod selector;

use std::sync::Arc;

use tracing::{debug, enabled, Level};

use crate::corpus::Category;
use crate::embedding::{EmbeddingIndex, EmbeddingProvider};

pub use crate::embedding::UNKNOWN_TAG;

/// Minimum cosine similarity for a pattern match to count.
///
/// Strictly greater-than. One value for every category; there is no
/// per-category override.
pub const SIMILARITY_THRESHOLD: f32 = 0.4;

/// Outcome of resolving one utterance.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Matched intent tag, or `"unknown"`.
    pub tag: String,
    /// Similarity of the nearest pattern, reported even when below threshold.
    pub score: f32,
    /// Longest known plant mentioned in the utterance.
    pub matched_plant: Option<String>,
}

impl Resolution {
    pub fn is_unknown(&self) -> bool {
        self.tag == UNKNOWN_TAG
    }
}

/// Maps utterances to intent tags via nearest-pattern similarity.
pub struct IntentResolver {
    provider: Arc<dyn EmbeddingProvider>,
    index: Arc<EmbeddingIndex>,
}

impl IntentResolver {
    /// `provider` must be the one `index` was built with.
    pub fn new(provider: Arc<dyn EmbeddingProvider>, index: Arc<EmbeddingIndex>) -> Self {
        Self { provider, index }
    }

    /// Nearest intent of `category` for `utterance`.
    ///
    /// A score at or below `SIMILARITY_THRESHOLD` resolves to `"unknown"`.
    pub fn resolve(&self, utterance: &str, category: Category) -> Resolution {
        let query = self.provider.embed(utterance);
        let best = self.index.nearest(&query, category);

        if enabled!(Level::DEBUG) {
            for (candidate, pattern) in self.index.search_top_k(&query, category, 3) {
                debug!(
                    "candidate '{}' ({:.3}) via pattern '{pattern}'",
                    candidate.tag, candidate.score
                );
            }
        }

        let tag = if best.score > SIMILARITY_THRESHOLD {
            best.tag
        } else {
            UNKNOWN_TAG.to_string()
        };
        debug!("resolved '{utterance}' in '{category}' to '{tag}' ({:.3})", best.score);

        Resolution {
            tag,
            score: best.score,
            matched_plant: None,
        }
    }

    pub fn index(&self) -> &EmbeddingIndex {
        &self.index
    }
}
