//! Plant name matcher — longest whole-word plant mention in an utterance.

use regex::Regex;

use super::{CorpusError, CorpusStore};

/// Known plant names, ordered longest-first for matching.
#[derive(Debug, Clone, Default)]
pub struct PlantVocabulary {
    /// (name, whole-word pattern), longest name first; equal lengths keep
    /// insertion order.
    candidates: Vec<(String, Regex)>,
}

impl PlantVocabulary {
    /// Build from plant names. Names are lowercased and deduplicated, keeping
    /// the first occurrence.
    pub fn new<I, S>(names: I) -> Result<Self, CorpusError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ordered: Vec<String> = Vec::new();
        for name in names {
            let name = name.as_ref().trim().to_lowercase();
            if !name.is_empty() && !ordered.contains(&name) {
                ordered.push(name);
            }
        }

        // sort_by_key is stable: ties stay in insertion order
        ordered.sort_by_key(|n| std::cmp::Reverse(n.chars().count()));

        let candidates = ordered
            .into_iter()
            .map(|name| {
                let pattern = format!(r"\b{}\b", regex::escape(&name));
                Regex::new(&pattern)
                    .map(|re| (name.clone(), re))
                    .map_err(|source| CorpusError::Plant {
                        plant: name,
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { candidates })
    }

    /// Vocabulary of every `plant` field in the corpus.
    pub fn from_corpus(corpus: &CorpusStore) -> Result<Self, CorpusError> {
        Self::new(corpus.plant_names())
    }

    /// Longest known plant mentioned as whole words in `utterance`.
    pub fn extract(&self, utterance: &str) -> Option<&str> {
        let lowered = utterance.to_lowercase();
        self.candidates
            .iter()
            .find(|(_, re)| re.is_match(&lowered))
            .map(|(name, _)| name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        let name = name.trim().to_lowercase();
        self.candidates.iter().any(|(n, _)| *n == name)
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}
