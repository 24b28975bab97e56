//! Current weather via the OpenWeatherMap API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{check_status, ServiceError};
use crate::routing::predicates::mentions_rain;

/// Current conditions for a city.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub description: String,
    pub rain_expected: bool,
}

impl WeatherReport {
    pub fn new(temp: f64, feels_like: f64, humidity: f64, description: &str) -> Self {
        Self {
            temp,
            feels_like,
            humidity,
            description: description.to_string(),
            rain_expected: mentions_rain(description),
        }
    }

    /// One-line summary shown to the user.
    pub fn summary(&self, city: &str) -> String {
        let rain = if self.rain_expected {
            "☔ Rain expected soon."
        } else {
            "🌤️ No rain expected today."
        };
        format!(
            "Weather in {}: {}, Temp: {}°C (feels like {}°C), Humidity: {}%. {}",
            title_case(city),
            self.description,
            self.temp,
            self.feels_like,
            self.humidity,
            rain
        )
    }
}

/// Weather failures. `Display` is the text shown to the user.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Please provide a city name to get the weather.")]
    MissingCity,

    #[error("Couldn't fetch weather for '{0}'. Please check the city name.")]
    UnknownCity(String),

    #[error("⚠️ Weather service not reachable right now.")]
    Unavailable(#[from] ServiceError),
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn get_weather(&self, city: Option<&str>) -> Result<WeatherReport, WeatherError>;
}

#[derive(Deserialize)]
struct OwmResponse {
    main: OwmMain,
    weather: Vec<OwmCondition>,
}

#[derive(Deserialize)]
struct OwmMain {
    temp: f64,
    feels_like: f64,
    humidity: f64,
}

#[derive(Deserialize)]
struct OwmCondition {
    description: String,
}

/// OpenWeatherMap "current weather" client, metric units.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenWeatherClient {
    pub fn new(http: Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn get_weather(&self, city: Option<&str>) -> Result<WeatherReport, WeatherError> {
        let city = city
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or(WeatherError::MissingCity)?;
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            ServiceError::MissingApiKey("OPENWEATHER_API_KEY not set".into())
        })?;

        let url = format!("{}/data/2.5/weather", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("q", city), ("appid", api_key), ("units", "metric")])
            .send()
            .await
            .map_err(ServiceError::from)?;

        let response = match check_status(response).await {
            Ok(r) => r,
            Err(ServiceError::ApiError { status, .. }) if status < 500 => {
                return Err(WeatherError::UnknownCity(city.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let body: OwmResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::InvalidResponse(format!("weather payload: {e}")))?;
        let condition = body
            .weather
            .first()
            .ok_or_else(|| ServiceError::InvalidResponse("no weather conditions".into()))?;

        Ok(WeatherReport::new(
            body.main.temp,
            body.main.feels_like,
            body.main.humidity,
            &condition.description,
        ))
    }
}

/// Capitalize the first letter of every word, lowercase the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}
