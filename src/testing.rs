//! Test doubles for the embedding provider and the outbound collaborators.
//! Each double counts its calls so tests can assert a path was not taken.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::corpus::Category;
use crate::embedding::{Embedding, EmbeddingProvider};
use crate::language::LanguageDetector;
use crate::services::catalog::{Product, ProductCatalog};
use crate::services::translate::Translator;
use crate::services::vision::ImageAnalyzer;
use crate::services::weather::{WeatherError, WeatherProvider, WeatherReport};
use crate::services::ServiceError;

fn mock_failure() -> ServiceError {
    ServiceError::InvalidResponse("mock failure".into())
}

/// Embeds registered texts to fixed vectors and anything else to zeros.
pub struct StaticProvider {
    dims: usize,
    vectors: HashMap<String, Embedding>,
    calls: AtomicUsize,
}

impl StaticProvider {
    pub fn new(dims: usize) -> Self {
        Self {
            dims,
            vectors: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with(mut self, text: &str, vector: Embedding) -> Self {
        assert_eq!(vector.len(), self.dims);
        self.vectors.insert(text.to_string(), vector);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EmbeddingProvider for StaticProvider {
    fn embed(&self, text: &str) -> Embedding {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.vectors
            .get(text)
            .cloned()
            .unwrap_or_else(|| vec![0.0; self.dims])
    }

    fn dimensions(&self) -> usize {
        self.dims
    }
}

enum WeatherMode {
    Report(WeatherReport),
    MissingCity,
    Unavailable,
}

pub struct MockWeather {
    mode: WeatherMode,
    calls: AtomicUsize,
}

impl MockWeather {
    fn with_mode(mode: WeatherMode) -> Self {
        Self {
            mode,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn reporting(report: WeatherReport) -> Self {
        Self::with_mode(WeatherMode::Report(report))
    }

    pub fn missing_city() -> Self {
        Self::with_mode(WeatherMode::MissingCity)
    }

    pub fn unavailable() -> Self {
        Self::with_mode(WeatherMode::Unavailable)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherProvider for MockWeather {
    async fn get_weather(&self, city: Option<&str>) -> Result<WeatherReport, WeatherError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.mode {
            WeatherMode::Report(report) if city.is_some() => Ok(report.clone()),
            WeatherMode::Report(_) | WeatherMode::MissingCity => Err(WeatherError::MissingCity),
            WeatherMode::Unavailable => Err(mock_failure().into()),
        }
    }
}

pub struct MockCatalog {
    listed: Vec<Product>,
    found: Vec<Product>,
    fail: bool,
    list_calls: AtomicUsize,
    search_calls: AtomicUsize,
    last_category: Mutex<Option<Option<Category>>>,
    last_query: Mutex<Option<String>>,
}

impl MockCatalog {
    fn new(listed: Vec<Product>, found: Vec<Product>, fail: bool) -> Self {
        Self {
            listed,
            found,
            fail,
            list_calls: AtomicUsize::new(0),
            search_calls: AtomicUsize::new(0),
            last_category: Mutex::new(None),
            last_query: Mutex::new(None),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new(), false)
    }

    pub fn listing(products: Vec<Product>) -> Self {
        Self::new(products, Vec::new(), false)
    }

    pub fn searching(products: Vec<Product>) -> Self {
        Self::new(Vec::new(), products, false)
    }

    pub fn failing() -> Self {
        Self::new(Vec::new(), Vec::new(), true)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    /// Category filter of the last listing; `None` if never listed.
    pub fn last_category(&self) -> Option<Option<Category>> {
        *self.last_category.lock().unwrap()
    }

    pub fn last_query(&self) -> Option<String> {
        self.last_query.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProductCatalog for MockCatalog {
    async fn list_products(
        &self,
        category: Option<Category>,
        limit: usize,
    ) -> Result<Vec<Product>, ServiceError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_category.lock().unwrap() = Some(category);
        if self.fail {
            return Err(mock_failure());
        }
        Ok(self.listed.iter().take(limit).cloned().collect())
    }

    async fn search_products(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Product>, ServiceError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some(query.to_string());
        if self.fail {
            return Err(mock_failure());
        }
        Ok(self.found.iter().take(limit).cloned().collect())
    }
}

/// Translates registered phrases to English and tags outgoing text with
/// the target language as `[lang] text`.
pub struct MockTranslator {
    to_english: HashMap<String, String>,
    fail: bool,
    calls: AtomicUsize,
}

impl MockTranslator {
    pub fn new() -> Self {
        Self {
            to_english: HashMap::new(),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn with(mut self, foreign: &str, english: &str) -> Self {
        self.to_english
            .insert(foreign.to_string(), english.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn to_english(&self, text: &str) -> Result<String, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(mock_failure());
        }
        Ok(self
            .to_english
            .get(text)
            .cloned()
            .unwrap_or_else(|| text.to_string()))
    }

    async fn from_english(&self, text: &str, target_lang: &str) -> Result<String, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(mock_failure());
        }
        Ok(format!("[{target_lang}] {text}"))
    }
}

pub struct MockDetector {
    answer: Option<String>,
    calls: AtomicUsize,
}

impl MockDetector {
    pub fn answering(lang: &str) -> Self {
        Self {
            answer: Some(lang.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            answer: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LanguageDetector for MockDetector {
    async fn detect(&self, _text: &str) -> Result<String, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.clone().ok_or_else(mock_failure)
    }
}

pub struct MockVision {
    answer: Option<String>,
    calls: AtomicUsize,
}

impl MockVision {
    pub fn replying(text: &str) -> Self {
        Self {
            answer: Some(text.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            answer: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageAnalyzer for MockVision {
    async fn analyze(&self, _image: &[u8]) -> Result<String, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.clone().ok_or_else(mock_failure)
    }
}
