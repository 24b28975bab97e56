//! TF-IDF sentence embedding over the intent corpus.
//!
//! The vocabulary and IDF weights come from every pattern of every category,
//! so one fixed embedding space is shared by all categories. Vectors are
//! normalized to unit length.

use std::collections::{HashMap, HashSet};

use super::{Embedding, EmbeddingProvider};
use crate::corpus::{Category, CorpusStore};

/// Function words that carry no intent signal.
///
/// Question words ("what", "which", "how") are kept: they separate advice
/// questions from symptom descriptions.
const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "it", "in", "on", "of", "to", "and", "or", "for", "with", "this",
    "that", "be", "are", "was", "were", "been", "being", "have", "has", "had", "do", "does",
    "did", "will", "would", "could", "should", "may", "might", "can", "shall", "but", "if", "at",
    "by", "from", "as", "into", "about", "up", "out", "so", "its", "you", "your", "i", "my", "me",
    "we", "our", "they", "them", "their", "he", "she", "his", "her", "there", "some", "any",
    "am", "im", "please",
];

/// TF-IDF embedding provider.
#[derive(Debug, Clone)]
pub struct TfIdfProvider {
    /// term → dimension index
    vocabulary: HashMap<String, usize>,
    /// IDF weight per dimension
    idf: Vec<f32>,
}

impl TfIdfProvider {
    /// Build from every pattern in the corpus.
    pub fn from_corpus(corpus: &CorpusStore) -> Self {
        let patterns: Vec<&str> = Category::ALL
            .into_iter()
            .flat_map(|c| corpus.records(c).iter())
            .flat_map(|r| r.patterns.iter().map(String::as_str))
            .collect();
        Self::from_documents(&patterns)
    }

    /// Build from raw documents: vocabulary in first-seen order, smoothed IDF.
    pub fn from_documents(documents: &[&str]) -> Self {
        let n = documents.len() as f32;
        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: Vec<usize> = Vec::new();

        for doc in documents {
            let tokens = tokenize(doc);
            let mut seen: HashSet<&str> = HashSet::new();
            for term in &tokens {
                if !seen.insert(term.as_str()) {
                    continue;
                }
                let next = vocabulary.len();
                let idx = *vocabulary.entry(term.clone()).or_insert(next);
                if idx == doc_freq.len() {
                    doc_freq.push(0);
                }
                doc_freq[idx] += 1;
            }
        }

        let idf = doc_freq
            .iter()
            .map(|&df| (n / (df.max(1) as f32)).ln() + 1.0)
            .collect();

        Self { vocabulary, idf }
    }

    /// Whether `term` (after normalization) is in the vocabulary.
    pub fn knows(&self, term: &str) -> bool {
        tokenize(term)
            .first()
            .is_some_and(|t| self.vocabulary.contains_key(t))
    }
}

impl EmbeddingProvider for TfIdfProvider {
    fn embed(&self, text: &str) -> Embedding {
        let dims = self.dimensions();
        if dims == 0 {
            return vec![];
        }

        let mut vector = vec![0.0f32; dims];
        for token in tokenize(text) {
            if let Some(&idx) = self.vocabulary.get(&token) {
                vector[idx] += self.idf[idx];
            }
        }

        normalize(&mut vector);
        vector
    }

    fn dimensions(&self) -> usize {
        self.idf.len()
    }
}

/// Lowercase, split on non-alphanumerics, drop stop words and single
/// characters, fold simple plurals.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 1)
        .filter(|w| !STOP_WORDS.contains(w))
        .map(singular)
        .collect()
}

/// "leaves" → "leaf" is out of reach; "aphids" → "aphid" and
/// "berries" → "berry" are enough for corpus patterns.
fn singular(word: &str) -> String {
    if word.chars().count() <= 3 || !word.is_ascii() {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{stem}y");
    }
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return word.to_string();
    }
    word.strip_suffix('s').unwrap_or(word).to_string()
}

/// Normalize a vector to unit length (in-place).
fn normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
