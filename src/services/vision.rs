//! Plant health analysis of leaf photos via the Gemini API.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::warn;

use super::{check_status, ServiceError};

pub const DEFAULT_GEMINI_BASE: &str = "https://generativelanguage.googleapis.com";

/// Instruction sent alongside every image.
pub const PLANT_HEALTH_PROMPT: &str = "Analyze this image of a plant leaf/part. \
Identify the plant type (if possible) and any signs of disease, pests, or nutrient deficiencies. \
Respond concisely with the potential disease/issue and recommended first steps for treatment. \
Format the response: 'Issue: [Disease/Deficiency]. Treatment: [Recommendation].'";

pub const NO_ANALYSIS_REPLY: &str = "🤔 Chatbot couldn't provide a specific analysis for this image.";
pub const IMAGE_FAILED_REPLY: &str = "⚠️ Unable to process the image for analysis.";

#[async_trait]
pub trait ImageAnalyzer: Send + Sync {
    /// Free-text analysis of the image; empty when the model had nothing to say.
    async fn analyze(&self, image: &[u8]) -> Result<String, ServiceError>;
}

/// User-facing plant health report for an image.
pub async fn plant_health_report(analyzer: &dyn ImageAnalyzer, image: &[u8]) -> String {
    match analyzer.analyze(image).await {
        Ok(text) if !text.trim().is_empty() => {
            format!("🌿 **Plant Health Report :**\n{}", text.trim())
        }
        Ok(_) => NO_ANALYSIS_REPLY.to_string(),
        Err(e) => {
            warn!("image analysis failed: {e}");
            IMAGE_FAILED_REPLY.to_string()
        }
    }
}

/// MIME type from the image's magic bytes.
pub fn sniff_mime(image: &[u8]) -> Option<&'static str> {
    if image.starts_with(&[0x89, b'P', b'N', b'G']) {
        Some("image/png")
    } else if image.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if image.starts_with(b"GIF8") {
        Some("image/gif")
    } else if image.len() >= 12 && &image[..4] == b"RIFF" && &image[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

/// Gemini `generateContent` client.
#[derive(Debug, Clone)]
pub struct GeminiVisionClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl GeminiVisionClient {
    pub fn new(http: Client, base_url: &str, api_key: Option<String>, model: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl ImageAnalyzer for GeminiVisionClient {
    async fn analyze(&self, image: &[u8]) -> Result<String, ServiceError> {
        let mime = sniff_mime(image)
            .ok_or_else(|| ServiceError::InvalidInput("unrecognized image format".into()))?;
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ServiceError::MissingApiKey("GEMINI_API_KEY not set".into()))?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = json!({
            "contents": [{
                "parts": [
                    {"text": PLANT_HEALTH_PROMPT},
                    {"inline_data": {"mime_type": mime, "data": BASE64.encode(image)}}
                ]
            }]
        });

        let response = self
            .http
            .post(&url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?;
        let reply: Value = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ServiceError::InvalidResponse(format!("gemini payload: {e}")))?;

        Ok(candidate_text(&reply))
    }
}

/// Concatenated text parts of the first candidate.
fn candidate_text(reply: &Value) -> String {
    reply
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockVision;
    use std::time::Duration;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn sniff_known_formats() {
        assert_eq!(sniff_mime(PNG), Some("image/png"));
        assert_eq!(sniff_mime(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(sniff_mime(b"RIFF\0\0\0\0WEBPVP8 "), Some("image/webp"));
        assert_eq!(sniff_mime(b"hello"), None);
    }

    #[test]
    fn candidate_text_joins_parts() {
        let reply = serde_json::json!({
            "candidates": [{"content": {"parts": [
                {"text": "Issue: Early blight. "},
                {"text": "Treatment: Copper fungicide."}
            ]}}]
        });
        assert_eq!(
            candidate_text(&reply),
            "Issue: Early blight. Treatment: Copper fungicide."
        );
        assert_eq!(candidate_text(&serde_json::json!({})), "");
    }

    #[tokio::test]
    async fn report_wraps_analysis() {
        let vision = MockVision::replying("Issue: Rust. Treatment: Sulfur spray.");
        let report = plant_health_report(&vision, PNG).await;
        assert_eq!(
            report,
            "🌿 **Plant Health Report :**\nIssue: Rust. Treatment: Sulfur spray."
        );
    }

    #[tokio::test]
    async fn report_handles_empty_and_failure() {
        let vision = MockVision::replying("   ");
        assert_eq!(plant_health_report(&vision, PNG).await, NO_ANALYSIS_REPLY);

        let vision = MockVision::failing();
        assert_eq!(plant_health_report(&vision, PNG).await, IMAGE_FAILED_REPLY);
    }

    #[tokio::test]
    async fn client_rejects_non_images_and_missing_key() {
        let http = crate::services::http_client(Duration::from_secs(1)).unwrap();
        let client = GeminiVisionClient::new(http, "http://127.0.0.1:1", None, "m");
        assert!(matches!(
            client.analyze(b"not an image").await,
            Err(ServiceError::InvalidInput(_))
        ));
        assert!(matches!(
            client.analyze(PNG).await,
            Err(ServiceError::MissingApiKey(_))
        ));
    }
}
