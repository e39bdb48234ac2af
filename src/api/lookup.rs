//! Direct lookups against third-party services, bypassing the assistant
//! backend. Only the descriptive fields of each payload are rendered.

use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

pub const OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org";
pub const WIKIPEDIA_BASE_URL: &str = "https://en.wikipedia.org";

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("no weather API key configured")]
    MissingKey,

    #[error("nothing found for {0:?}")]
    NotFound(String),

    #[error("lookup request failed: {0}")]
    Request(#[from] reqwest::Error),
}

pub struct WeatherClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl WeatherClient {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self, LookupError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        })
    }

    /// Current conditions for `city`, already formatted for display.
    pub async fn current(&self, city: &str) -> Result<String, LookupError> {
        let api_key = self.api_key.as_deref().ok_or(LookupError::MissingKey)?;
        let url = format!("{}/data/2.5/weather", self.base_url);

        let data: Value = self
            .client
            .get(&url)
            .query(&[("q", city), ("appid", api_key), ("units", "metric")])
            .send()
            .await?
            .json()
            .await?;

        format_weather(city, &data).ok_or_else(|| LookupError::NotFound(city.to_string()))
    }
}

/// The service reports `cod` as a number on success and as a string on
/// failure, so both shapes are accepted.
fn format_weather(city: &str, data: &Value) -> Option<String> {
    let cod = match &data["cod"] {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    };
    if cod != Some(200) {
        return None;
    }

    let temp = data["main"]["temp"].as_f64()?;
    let humidity = data["main"]["humidity"].as_f64()?;
    let description = data["weather"][0]["description"].as_str()?;
    let wind = data["wind"]["speed"].as_f64()?;

    Some(format!(
        "{city}: {temp}°C, {description}\nHumidity: {humidity}%\nWind Speed: {wind} m/s"
    ))
}

pub struct WikipediaClient {
    client: Client,
    base_url: String,
}

impl WikipediaClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LookupError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Plain-text summary of the page for `topic`.
    pub async fn summary(&self, topic: &str) -> Result<String, LookupError> {
        let url = format!(
            "{}/api/rest_v1/page/summary/{}",
            self.base_url,
            urlencoding::encode(topic)
        );

        let data: Value = self.client.get(&url).send().await?.json().await?;

        data["extract"]
            .as_str()
            .filter(|extract| !extract.is_empty())
            .map(str::to_string)
            .ok_or_else(|| LookupError::NotFound(topic.to_string()))
    }
}
