//! Translation to and from English.
//!
//! `GoogleTranslateClient` talks to the public `translate_a/single` endpoint,
//! which also reports the detected source language, so the same client backs
//! language detection. The last auto-detected translation is kept so that a
//! `detect` followed by `to_english` on the same text costs one request.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use super::{check_status, ServiceError};
use crate::language::LanguageDetector;

pub const DEFAULT_TRANSLATE_BASE: &str = "https://translate.googleapis.com";

#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate from any language into English.
    async fn to_english(&self, text: &str) -> Result<String, ServiceError>;
    /// Translate English text into `target_lang`.
    async fn from_english(&self, text: &str, target_lang: &str) -> Result<String, ServiceError>;
}

/// Pass-through translator for English-only deployments.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTranslator;

#[async_trait]
impl Translator for IdentityTranslator {
    async fn to_english(&self, text: &str) -> Result<String, ServiceError> {
        Ok(text.to_string())
    }

    async fn from_english(&self, text: &str, _target_lang: &str) -> Result<String, ServiceError> {
        Ok(text.to_string())
    }
}

/// A translated text and the language the service detected for the input.
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    pub text: String,
    pub source_lang: Option<String>,
}

impl Translation {
    /// Parse the `[[["translated", "original", ...], ...], null, "src", ...]` shape.
    pub fn from_json(body: &Value) -> Result<Self, ServiceError> {
        let segments = body
            .get(0)
            .and_then(Value::as_array)
            .ok_or_else(|| ServiceError::InvalidResponse("no translation segments".into()))?;
        let text: String = segments
            .iter()
            .filter_map(|seg| seg.get(0).and_then(Value::as_str))
            .collect();
        let source_lang = body.get(2).and_then(Value::as_str).map(String::from);
        Ok(Self { text, source_lang })
    }
}

/// Client for Google's keyless translate endpoint.
#[derive(Debug, Clone)]
pub struct GoogleTranslateClient {
    http: Client,
    base_url: String,
    /// (input text, its `auto` → English translation)
    last_auto: Arc<Mutex<Option<(String, Translation)>>>,
}

impl GoogleTranslateClient {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            last_auto: Arc::new(Mutex::new(None)),
        }
    }

    /// `auto` → English, reusing the previous result for the same text.
    async fn translate_auto(&self, text: &str) -> Result<Translation, ServiceError> {
        if let Some((cached_text, translation)) = self.last_auto.lock().await.as_ref() {
            if cached_text == text {
                debug!("reusing auto-detected translation");
                return Ok(translation.clone());
            }
        }
        let translation = self.translate(text, "auto", "en").await?;
        *self.last_auto.lock().await = Some((text.to_string(), translation.clone()));
        Ok(translation)
    }

    /// Translate `text` from `source` ("auto" to detect) into `target`.
    pub async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<Translation, ServiceError> {
        let url = format!(
            "{}/translate_a/single?client=gtx&sl={}&tl={}&dt=t&q={}",
            self.base_url,
            urlencoding::encode(source),
            urlencoding::encode(target),
            urlencoding::encode(text)
        );
        let response = self.http.get(&url).send().await?;
        let body: Value = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ServiceError::InvalidResponse(format!("translation payload: {e}")))?;
        Translation::from_json(&body)
    }
}

#[async_trait]
impl Translator for GoogleTranslateClient {
    async fn to_english(&self, text: &str) -> Result<String, ServiceError> {
        Ok(self.translate_auto(text).await?.text)
    }

    async fn from_english(&self, text: &str, target_lang: &str) -> Result<String, ServiceError> {
        if target_lang == "en" {
            return Ok(text.to_string());
        }
        Ok(self.translate(text, "en", target_lang).await?.text)
    }
}

#[async_trait]
impl LanguageDetector for GoogleTranslateClient {
    async fn detect(&self, text: &str) -> Result<String, ServiceError> {
        self.translate_auto(text)
            .await?
            .source_lang
            .ok_or_else(|| ServiceError::InvalidResponse("no detected language".into()))
    }
}
