//! The assistant: immutable context shared by every turn.
//!
//! Holds the corpus, the embedding index, the plant vocabulary and the
//! collaborator clients. Built once at startup; each `get_response` call is
//! independent and may run concurrently with others.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::corpus::plants::PlantVocabulary;
use crate::corpus::{Category, CorpusError, CorpusStore};
use crate::embedding::tfidf::TfIdfProvider;
use crate::embedding::{EmbeddingIndex, EmbeddingProvider};
use crate::language::{LanguageDetector, SafeDetector, ScriptDetector, ENGLISH};
use crate::multimodal::{should_run_chatbot, MultimodalInput, MultimodalReply, Transcript};
use crate::routing::selector::{
    Reply, ResponseSelector, DEFAULT_FRONTEND_BASE, DEFAULT_PRODUCT_LIMIT,
};
use crate::routing::IntentResolver;
use crate::services::catalog::ProductCatalog;
use crate::services::translate::{IdentityTranslator, Translator};
use crate::services::vision::{plant_health_report, ImageAnalyzer, IMAGE_FAILED_REPLY};
use crate::services::weather::WeatherProvider;

/// Input rejected before resolution. `Display` is the guidance shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("No message provided.")]
    Blank,

    #[error("Please select a valid category: flowers, fruits, or vegetables.")]
    InvalidCategory(String),
}

pub struct Assistant {
    corpus: Arc<CorpusStore>,
    selector: ResponseSelector,
    translator: Arc<dyn Translator>,
    detector: SafeDetector,
    vision: Option<Arc<dyn ImageAnalyzer>>,
}

impl Assistant {
    pub fn builder(
        corpus: CorpusStore,
        weather: Arc<dyn WeatherProvider>,
        catalog: Arc<dyn ProductCatalog>,
    ) -> AssistantBuilder {
        AssistantBuilder::new(corpus, weather, catalog)
    }

    pub fn corpus(&self) -> &CorpusStore {
        &self.corpus
    }

    pub fn index(&self) -> &EmbeddingIndex {
        self.selector.resolver().index()
    }

    /// Answer one utterance, or say why it was rejected.
    ///
    /// Validation runs first, so rejected input reaches no collaborator.
    pub async fn respond(
        &self,
        message: &str,
        category: &str,
        city: Option<&str>,
    ) -> Result<Reply, InputError> {
        let category: Category = category
            .parse()
            .map_err(|_| InputError::InvalidCategory(category.to_string()))?;
        let message = message.trim();
        if message.is_empty() {
            return Err(InputError::Blank);
        }

        let lang = self.detector.detect(message).await;
        let english = if lang == ENGLISH {
            message.to_string()
        } else {
            match self.translator.to_english(message).await {
                Ok(text) => text,
                Err(e) => {
                    warn!("translation to English failed: {e}");
                    message.to_string()
                }
            }
        };
        debug!(
            original = message,
            lang = %lang,
            translated = %english,
            category = %category,
            city = ?city,
            "incoming message"
        );

        let mut reply = self.selector.select(&english, category, city).await;
        info!("answered via {:?}", reply.branch);
        if lang != ENGLISH {
            match self.translator.from_english(&reply.text, &lang).await {
                Ok(text) => reply.text = text,
                Err(e) => warn!("translation to '{lang}' failed: {e}"),
            }
        }
        Ok(reply)
    }

    /// Single text entry point: the reply, or the guidance for bad input.
    pub async fn get_response(&self, message: &str, category: &str, city: Option<&str>) -> String {
        match self.respond(message, category, city).await {
            Ok(reply) => reply.text,
            Err(e) => {
                debug!("rejected input: {e:?}");
                e.to_string()
            }
        }
    }

    /// Plant health report for a leaf photo.
    pub async fn analyze_image(&self, image: &[u8]) -> String {
        match &self.vision {
            Some(vision) => plant_health_report(vision.as_ref(), image).await,
            None => {
                warn!("no image analyzer configured");
                IMAGE_FAILED_REPLY.to_string()
            }
        }
    }

    /// Answer a turn with any mix of typed text, transcript and image.
    pub async fn multimodal(&self, input: &MultimodalInput) -> String {
        if let Some(Transcript::Unclear(reason)) = &input.transcript {
            warn!("audio not clear: {reason}");
        }

        let image_report = match &input.image {
            Some(image) => Some(self.analyze_image(image).await),
            None => None,
        };

        let text = input.chatbot_input();
        let chatbot = if should_run_chatbot(text, image_report.is_some()) {
            Some(
                self.get_response(text, &input.category, input.city.as_deref())
                    .await,
            )
        } else {
            None
        };

        MultimodalReply {
            heard: input
                .transcript
                .as_ref()
                .and_then(Transcript::heard)
                .map(String::from),
            message: Some(input.message.clone()),
            image_report,
            chatbot,
        }
        .render()
    }
}

/// Builder for `Assistant`. Weather and catalog are required; everything
/// else has an offline default.
pub struct AssistantBuilder {
    corpus: CorpusStore,
    weather: Arc<dyn WeatherProvider>,
    catalog: Arc<dyn ProductCatalog>,
    provider: Option<Arc<dyn EmbeddingProvider>>,
    translator: Arc<dyn Translator>,
    detector: Arc<dyn LanguageDetector>,
    vision: Option<Arc<dyn ImageAnalyzer>>,
    seed: Option<u64>,
    product_limit: usize,
    frontend_base: String,
}

impl AssistantBuilder {
    pub fn new(
        corpus: CorpusStore,
        weather: Arc<dyn WeatherProvider>,
        catalog: Arc<dyn ProductCatalog>,
    ) -> Self {
        Self {
            corpus,
            weather,
            catalog,
            provider: None,
            translator: Arc::new(IdentityTranslator),
            detector: Arc::new(ScriptDetector),
            vision: None,
            seed: None,
            product_limit: DEFAULT_PRODUCT_LIMIT,
            frontend_base: DEFAULT_FRONTEND_BASE.to_string(),
        }
    }

    /// Embedding provider for corpus and queries. Defaults to TF-IDF over the corpus.
    pub fn with_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = translator;
        self
    }

    pub fn with_detector(mut self, detector: Arc<dyn LanguageDetector>) -> Self {
        self.detector = detector;
        self
    }

    pub fn with_vision(mut self, vision: Arc<dyn ImageAnalyzer>) -> Self {
        self.vision = Some(vision);
        self
    }

    /// Fix the response-choice RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_product_limit(mut self, limit: usize) -> Self {
        self.product_limit = limit;
        self
    }

    pub fn with_frontend_base(mut self, base: &str) -> Self {
        self.frontend_base = base.to_string();
        self
    }

    /// Embed the corpus and assemble the assistant.
    pub fn build(self) -> Result<Assistant, CorpusError> {
        if self.corpus.is_empty() {
            warn!("corpus is empty; every question will go unanswered");
        }

        let corpus = Arc::new(self.corpus);
        let provider: Arc<dyn EmbeddingProvider> = match self.provider {
            Some(p) => p,
            None => Arc::new(TfIdfProvider::from_corpus(&corpus)),
        };
        let index = Arc::new(EmbeddingIndex::build(&corpus, provider.as_ref()));
        let vocabulary = Arc::new(PlantVocabulary::from_corpus(&corpus)?);
        info!(
            "assistant ready: {} embedding dimensions, {} known plants",
            provider.dimensions(),
            vocabulary.len()
        );

        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let selector = ResponseSelector::new(
            corpus.clone(),
            vocabulary,
            IntentResolver::new(provider, index),
            self.weather,
            self.catalog,
            rng,
        )
        .with_product_limit(self.product_limit)
        .with_frontend_base(&self.frontend_base);

        Ok(Assistant {
            corpus,
            selector,
            translator: self.translator,
            detector: SafeDetector::new(self.detector),
            vision: self.vision,
        })
    }
}
