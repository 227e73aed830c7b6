//! Weather lookup listener.
//!
//! Answers `!weather` with one line per configured location, fetched from a
//! REST endpoint returning `{temperature, humidity}` JSON.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;

use crate::config::WeatherConfig;

use super::Listener;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Listener reporting current conditions for a fixed set of locations.
pub struct WeatherListener {
    client: reqwest::Client,
    config: WeatherConfig,
}

#[derive(Debug, Deserialize)]
struct Observation {
    temperature: f64,
    humidity: f64,
}

impl WeatherListener {
    /// Create the listener from its backend configuration.
    pub fn new(config: WeatherConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { client, config }
    }

    async fn observation_line(&self, location: &str) -> anyhow::Result<String> {
        let url = format!("{}/{}", self.config.base_url, location);
        let observation = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .with_context(|| format!("weather request for {location} failed"))?
            .json::<Observation>()
            .await
            .with_context(|| format!("weather response for {location} was not valid JSON"))?;

        Ok(format!(
            "{}: {}˚ & {}%",
            capitalize(location),
            observation.temperature,
            observation.humidity
        ))
    }
}

#[async_trait]
impl Listener for WeatherListener {
    fn name(&self) -> &'static str {
        "weather"
    }

    async fn invoke(&self, text: &str, _bot_nick: &str) -> anyhow::Result<Vec<String>> {
        if !text.starts_with("!weather") {
            return Ok(vec![]);
        }

        let mut lines = Vec::with_capacity(self.config.locations.len());
        for location in &self.config.locations {
            lines.push(self.observation_line(location).await?);
        }
        Ok(lines)
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("outdoor"), "Outdoor");
        assert_eq!(capitalize(""), "");
    }

    #[tokio::test]
    async fn test_ignores_unrelated_messages() {
        let listener = WeatherListener::new(WeatherConfig {
            base_url: "http://127.0.0.1:1/weather".into(),
            locations: vec!["outdoor".into()],
        });

        // No trigger, no request: an unreachable backend must not matter.
        let lines = listener.invoke("hello everyone", "bot").await.unwrap();
        assert!(lines.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_an_error() {
        let listener = WeatherListener::new(WeatherConfig {
            base_url: "http://127.0.0.1:1/weather".into(),
            locations: vec!["outdoor".into()],
        });

        assert!(listener.invoke("!weather", "bot").await.is_err());
    }
}
