//! Response selection — the branch ladder run for every English utterance.
//!
//! Branches are tried in a fixed order and the first that applies answers:
//! weather, product recommendation, intent specific to the mentioned plant,
//! generic intent, product search by plant name, and finally the rephrase
//! reply.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::predicates::{is_recommendation_query, is_recommendation_tag, is_weather_query};
use super::{IntentResolver, Resolution};
use crate::corpus::plants::PlantVocabulary;
use crate::corpus::{Category, CorpusStore, IntentRecord, ResponseTemplate};
use crate::services::catalog::{format_recommendations, Product, ProductCatalog};
use crate::services::weather::WeatherProvider;

pub const UNKNOWN_REPLY: &str = "I'm not sure I understand. Could you please rephrase?";

/// Used when a matched record carries no responses.
pub const EMPTY_RESPONSES_REPLY: &str = "I'm not sure I got that.";

pub const DEFAULT_PRODUCT_LIMIT: usize = 5;
pub const DEFAULT_FRONTEND_BASE: &str = "http://localhost:3000";

/// Which strategy produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    Weather,
    Recommendation,
    IntentWithPlant,
    GenericIntent,
    PlantProducts,
    Unknown,
}

/// An English reply and how it was reached.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub branch: Branch,
    /// Absent when a keyword branch answered before resolution ran.
    pub resolution: Option<Resolution>,
}

impl Reply {
    fn new(text: String, branch: Branch, resolution: Option<Resolution>) -> Self {
        Self {
            text,
            branch,
            resolution,
        }
    }
}

pub struct ResponseSelector {
    corpus: Arc<CorpusStore>,
    vocabulary: Arc<PlantVocabulary>,
    resolver: IntentResolver,
    weather: Arc<dyn WeatherProvider>,
    catalog: Arc<dyn ProductCatalog>,
    rng: Mutex<StdRng>,
    product_limit: usize,
    frontend_base: String,
}

impl ResponseSelector {
    pub fn new(
        corpus: Arc<CorpusStore>,
        vocabulary: Arc<PlantVocabulary>,
        resolver: IntentResolver,
        weather: Arc<dyn WeatherProvider>,
        catalog: Arc<dyn ProductCatalog>,
        rng: StdRng,
    ) -> Self {
        Self {
            corpus,
            vocabulary,
            resolver,
            weather,
            catalog,
            rng: Mutex::new(rng),
            product_limit: DEFAULT_PRODUCT_LIMIT,
            frontend_base: DEFAULT_FRONTEND_BASE.to_string(),
        }
    }

    pub fn with_product_limit(mut self, limit: usize) -> Self {
        self.product_limit = limit;
        self
    }

    pub fn with_frontend_base(mut self, base: &str) -> Self {
        self.frontend_base = base.to_string();
        self
    }

    pub fn resolver(&self) -> &IntentResolver {
        &self.resolver
    }

    /// Pick the reply for an English utterance in a validated category.
    pub async fn select(&self, utterance: &str, category: Category, city: Option<&str>) -> Reply {
        if is_weather_query(utterance) {
            info!("weather branch (city: {city:?})");
            return Reply::new(self.weather_reply(city).await, Branch::Weather, None);
        }

        if is_recommendation_query(utterance) {
            info!("recommendation branch by keyword");
            return Reply::new(
                self.recommendation_reply(category).await,
                Branch::Recommendation,
                None,
            );
        }

        let mut resolution = self.resolver.resolve(utterance, category);
        if is_recommendation_tag(&resolution.tag) {
            info!("recommendation branch by intent '{}'", resolution.tag);
            return Reply::new(
                self.recommendation_reply(category).await,
                Branch::Recommendation,
                Some(resolution),
            );
        }

        let plant = self.vocabulary.extract(utterance).map(String::from);
        resolution.matched_plant = plant.clone();
        debug!("tag '{}', plant {:?}", resolution.tag, plant);

        if let Some(plant) = plant.as_deref() {
            let record = self
                .corpus
                .search_order(category)
                .find(|r| r.tag == resolution.tag && r.matches_plant(plant));
            if let Some(record) = record {
                let response = self.pick_response(record).await;
                let text = match response.details() {
                    Some(details) => {
                        format!("{}\n\n**Pesticide Info:** {details}", response.message)
                    }
                    None => response.message,
                };
                return Reply::new(text, Branch::IntentWithPlant, Some(resolution));
            }
        }

        let generic = self
            .corpus
            .search_order(category)
            .find(|r| r.tag == resolution.tag && r.plant.is_none());
        if let Some(record) = generic {
            let response = self.pick_response(record).await;
            let text = match response.details() {
                Some(details) => format!("{}\n\n{details}", response.message),
                None => response.message,
            };
            return Reply::new(text, Branch::GenericIntent, Some(resolution));
        }

        if let Some(plant) = plant.as_deref() {
            let products = self.search_products(plant).await;
            if !products.is_empty() {
                info!("{} products for plant '{plant}'", products.len());
                return Reply::new(
                    format_recommendations(&products, &self.frontend_base),
                    Branch::PlantProducts,
                    Some(resolution),
                );
            }
        }

        Reply::new(UNKNOWN_REPLY.to_string(), Branch::Unknown, Some(resolution))
    }

    async fn weather_reply(&self, city: Option<&str>) -> String {
        match self.weather.get_weather(city).await {
            Ok(report) => report.summary(city.unwrap_or_default().trim()),
            Err(e) => {
                warn!("weather lookup failed: {e:?}");
                e.to_string()
            }
        }
    }

    async fn recommendation_reply(&self, category: Category) -> String {
        let filter = (!category.is_fallback()).then_some(category);
        let products = match self.catalog.list_products(filter, self.product_limit).await {
            Ok(products) => products,
            Err(e) => {
                warn!("product listing failed: {e}");
                Vec::new()
            }
        };
        format_recommendations(&products, &self.frontend_base)
    }

    async fn search_products(&self, plant: &str) -> Vec<Product> {
        match self.catalog.search_products(plant, self.product_limit).await {
            Ok(products) => products,
            Err(e) => {
                warn!("product search for '{plant}' failed: {e}");
                Vec::new()
            }
        }
    }

    async fn pick_response(&self, record: &IntentRecord) -> ResponseTemplate {
        let mut rng = self.rng.lock().await;
        record
            .responses
            .choose(&mut *rng)
            .cloned()
            .unwrap_or_else(|| ResponseTemplate::new(EMPTY_RESPONSES_REPLY))
    }
}
