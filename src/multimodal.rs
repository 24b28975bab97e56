//! Combined replies for turns that carry voice, an image, or both.
//!
//! The caller transcribes audio and analyzes the image; this module decides
//! what the chatbot sees and how the pieces are laid out.

use crate::routing::predicates::is_generic_image_request;

pub const NO_INPUT_REPLY: &str = "No valid input (text, audio, or image) was processed.";

/// Outcome of speech recognition for an attached recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transcript {
    Heard(String),
    /// Recognition failed; carries the reason.
    Unclear(String),
}

impl Transcript {
    pub fn heard(&self) -> Option<&str> {
        match self {
            Transcript::Heard(text) if !text.trim().is_empty() => Some(text),
            _ => None,
        }
    }
}

/// One multimodal turn.
#[derive(Debug, Clone, Default)]
pub struct MultimodalInput {
    /// Typed text; may be empty.
    pub message: String,
    pub transcript: Option<Transcript>,
    pub image: Option<Vec<u8>>,
    pub category: String,
    pub city: Option<String>,
}

impl MultimodalInput {
    pub fn new(message: &str, category: &str) -> Self {
        Self {
            message: message.to_string(),
            category: category.to_string(),
            ..Self::default()
        }
    }

    pub fn with_transcript(mut self, transcript: Transcript) -> Self {
        self.transcript = Some(transcript);
        self
    }

    pub fn with_image(mut self, image: Vec<u8>) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_city(mut self, city: &str) -> Self {
        self.city = Some(city.to_string());
        self
    }

    /// Text handed to the chatbot: a heard transcript replaces the message.
    pub fn chatbot_input(&self) -> &str {
        self.transcript
            .as_ref()
            .and_then(Transcript::heard)
            .unwrap_or(self.message.as_str())
    }
}

/// Whether the chatbot should answer `input`.
///
/// Blank input never runs it. With an image report present, the stock
/// "look at this picture" phrases are left to the image analysis alone.
pub fn should_run_chatbot(input: &str, has_image_report: bool) -> bool {
    if input.trim().is_empty() {
        return false;
    }
    !(has_image_report && is_generic_image_request(input))
}

/// Rendered parts of a multimodal reply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultimodalReply {
    pub heard: Option<String>,
    pub message: Option<String>,
    pub image_report: Option<String>,
    pub chatbot: Option<String>,
}

impl MultimodalReply {
    /// Echo line, image report and chatbot reply, blank-line separated.
    pub fn render(&self) -> String {
        let mut parts = Vec::new();
        if let Some(heard) = &self.heard {
            parts.push(format!("🎤 You said: {heard}"));
        } else if let Some(message) = self.message.as_deref().filter(|m| !m.is_empty()) {
            parts.push(format!("💬 Message: {message}"));
        }
        if let Some(report) = self.image_report.as_deref().filter(|r| !r.is_empty()) {
            parts.push(format!("🖼️ Image Analysis:\n{report}"));
        }
        if let Some(reply) = self.chatbot.as_deref().filter(|r| !r.is_empty()) {
            parts.push(format!("🤖 Chatbot: {reply}"));
        }

        let text = parts.join("\n\n");
        if text.trim().is_empty() {
            NO_INPUT_REPLY.to_string()
        } else {
            text.trim().to_string()
        }
    }
}
