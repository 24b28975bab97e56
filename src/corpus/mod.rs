//! Intent corpus — per-category intent records loaded from JSON.
//!
//! Each category lives in `<dir>/<category>.json` shaped as `{"intents": [...]}`.
//! Records are immutable after load and owned by the store; categories never
//! share records. The `intents` category holds always-applicable fallbacks
//! that are searched after the requested category.

pub mod plants;

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use tracing::{error, info, warn};

/// Errors from loading the corpus.
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid corpus JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid plant name '{plant}': {source}")]
    Plant {
        plant: String,
        #[source]
        source: regex::Error,
    },
}

/// Topical partition of the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Intents,
    Fruits,
    Flowers,
    Vegetables,
}

impl Category {
    /// Every category, in load order.
    pub const ALL: [Category; 4] = [
        Category::Intents,
        Category::Fruits,
        Category::Flowers,
        Category::Vegetables,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Intents => "intents",
            Category::Fruits => "fruits",
            Category::Flowers => "flowers",
            Category::Vegetables => "vegetables",
        }
    }

    /// The `intents` category is unioned into every record search.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Category::Intents)
    }

    /// File name of this category inside the corpus directory.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.as_str())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A category name outside the enumerated set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "intents" => Ok(Category::Intents),
            "fruits" => Ok(Category::Fruits),
            "flowers" => Ok(Category::Flowers),
            "vegetables" => Ok(Category::Vegetables),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

/// One response template of an intent record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResponseTemplate {
    pub message: String,
    #[serde(default)]
    pub details: Option<String>,
}

impl ResponseTemplate {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: &str) -> Self {
        self.details = Some(details.to_string());
        self
    }

    /// Details text, treating an empty string as absent.
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref().filter(|d| !d.trim().is_empty())
    }
}

/// A recognized user need within a category.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IntentRecord {
    pub tag: String,
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub responses: Vec<ResponseTemplate>,
    /// Lowercase plant name this record is specific to.
    #[serde(default)]
    pub plant: Option<String>,
}

impl IntentRecord {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            patterns: Vec::new(),
            responses: Vec::new(),
            plant: None,
        }
    }

    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.patterns.push(pattern.to_string());
        self
    }

    pub fn with_response(mut self, response: ResponseTemplate) -> Self {
        self.responses.push(response);
        self
    }

    pub fn with_plant(mut self, plant: &str) -> Self {
        self.plant = Some(plant.to_string());
        self.normalize();
        self
    }

    /// Whether this record is specific to `plant` (case-insensitive).
    pub fn matches_plant(&self, plant: &str) -> bool {
        self.plant
            .as_deref()
            .is_some_and(|own| own.eq_ignore_ascii_case(plant.trim()))
    }

    fn normalize(&mut self) {
        self.plant = self
            .plant
            .take()
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty());
    }
}

#[derive(Deserialize)]
struct CorpusFile {
    #[serde(default)]
    intents: Vec<IntentRecord>,
}

/// All intent records, partitioned by category.
#[derive(Debug, Clone, Default)]
pub struct CorpusStore {
    records: HashMap<Category, Vec<IntentRecord>>,
}

impl CorpusStore {
    /// Build a store from in-memory records (synthetic corpora, tests).
    pub fn from_records<I>(categories: I) -> Self
    where
        I: IntoIterator<Item = (Category, Vec<IntentRecord>)>,
    {
        let mut records: HashMap<Category, Vec<IntentRecord>> = HashMap::new();
        for (category, mut list) in categories {
            list.iter_mut().for_each(IntentRecord::normalize);
            records.entry(category).or_default().extend(list);
        }
        Self { records }
    }

    /// Load every category file from `dir`.
    ///
    /// A missing file is skipped with a warning; an unreadable or malformed one
    /// is logged and leaves its category empty. Neither aborts the load.
    pub fn load_dir(dir: &Path) -> Self {
        let mut records = HashMap::new();
        for category in Category::ALL {
            let path = dir.join(category.file_name());
            if !path.is_file() {
                warn!("{} not found, skipping", path.display());
                continue;
            }
            match Self::load_file(&path) {
                Ok(list) => {
                    info!("loaded {} intent records for '{category}'", list.len());
                    records.insert(category, list);
                }
                Err(e) => error!("{e}"),
            }
        }
        Self { records }
    }

    /// Parse a single category file.
    pub fn load_file(path: &Path) -> Result<Vec<IntentRecord>, CorpusError> {
        let content = std::fs::read_to_string(path).map_err(|source| CorpusError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let file: CorpusFile =
            serde_json::from_str(&content).map_err(|source| CorpusError::Json {
                path: path.display().to_string(),
                source,
            })?;
        let mut intents = file.intents;
        intents.iter_mut().for_each(IntentRecord::normalize);
        Ok(intents)
    }

    /// Records of one category (empty if none were loaded).
    pub fn records(&self, category: Category) -> &[IntentRecord] {
        self.records
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Record search order for a request: the category's records, then the
    /// `intents` fallbacks. First tag match wins, so a tag duplicated across
    /// the two resolves to the category's own record.
    pub fn search_order(&self, category: Category) -> impl Iterator<Item = &IntentRecord> {
        let fallback = if category.is_fallback() {
            &[][..]
        } else {
            self.records(Category::Intents)
        };
        self.records(category).iter().chain(fallback.iter())
    }

    /// Number of patterns in a category.
    pub fn pattern_count(&self, category: Category) -> usize {
        self.records(category).iter().map(|r| r.patterns.len()).sum()
    }

    /// Plant names of all records, in category load order then record order.
    pub fn plant_names(&self) -> impl Iterator<Item = &str> {
        Category::ALL
            .into_iter()
            .flat_map(move |c| self.records(c).iter())
            .filter_map(|r| r.plant.as_deref())
    }

    /// Whether no category holds any record.
    pub fn is_empty(&self) -> bool {
        self.records.values().all(Vec::is_empty)
    }
}
