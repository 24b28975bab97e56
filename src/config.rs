//! Application configuration: an optional YAML file plus environment overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config YAML in {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding `<category>.json` corpus files.
    pub corpus_dir: PathBuf,
    /// Commerce backend serving `/api/products`.
    pub backend_base: String,
    /// Storefront used for product links.
    pub frontend_base: String,
    pub weather_base: String,
    pub weather_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    /// Detect and translate non-English input.
    pub translate: bool,
    pub product_limit: usize,
    pub request_timeout_secs: u64,
    /// Fixed seed for response choice; random when unset.
    pub seed: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            corpus_dir: PathBuf::from("data"),
            backend_base: "http://localhost:5454".into(),
            frontend_base: "http://localhost:3000".into(),
            weather_base: "https://api.openweathermap.org".into(),
            weather_api_key: None,
            gemini_api_key: None,
            gemini_model: "gemini-2.5-flash".into(),
            translate: true,
            product_limit: 5,
            request_timeout_secs: 5,
            seed: None,
        }
    }
}

impl AppConfig {
    /// Read `path` if given, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let config = Self::from_file(path)?;
                info!("loaded config from {}", path.display());
                config
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|source| ConfigError::Yaml {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        // an empty document deserializes as unit, not as an empty mapping
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }

    /// Override fields from `BACKEND_BASE`, `FRONTEND_BASE`,
    /// `OPENWEATHER_API_KEY` and `GEMINI_API_KEY`. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = var("BACKEND_BASE") {
            self.backend_base = v;
        }
        if let Some(v) = var("FRONTEND_BASE") {
            self.frontend_base = v;
        }
        if let Some(v) = var("OPENWEATHER_API_KEY") {
            self.weather_api_key = Some(v);
        }
        if let Some(v) = var("GEMINI_API_KEY") {
            self.gemini_api_key = Some(v);
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
