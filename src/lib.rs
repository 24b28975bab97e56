//! cropchat: an agricultural assistant.
//!
//! Free-text questions about plant health, pesticides and weather are
//! resolved against per-category intent corpora by embedding similarity,
//! then answered from the corpus, a weather service, or the product catalog
//! of a commerce backend.

pub mod assistant;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod language;
pub mod multimodal;
pub mod routing;
pub mod services;

#[cfg(test)]
mod testing;

pub use assistant::{Assistant, AssistantBuilder, InputError};
pub use corpus::{Category, CorpusStore};
