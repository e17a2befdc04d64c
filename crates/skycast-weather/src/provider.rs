//! OpenWeather current-conditions and forecast client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use skycast_core::{NetworkError, Units, WeatherConfig};
use tracing::instrument;

use crate::error::WeatherError;
use crate::types::{
    ApiCurrentResponse, ApiForecastResponse, CurrentConditions, Forecast, WeatherReport,
};

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Remote weather data as seen by the controllers.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Current conditions and forecast for a coordinate pair.
    async fn fetch(&self, lat: f64, lon: f64, units: Units) -> Result<WeatherReport, WeatherError>;
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl WeatherProvider {
    /// Build a provider from config. Fails when no API key is available.
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherError> {
        Self::with_resolved_key(&config.base_url, config.resolved_api_key())
    }

    fn with_resolved_key(base_url: &str, api_key: Option<String>) -> Result<Self, WeatherError> {
        let api_key = api_key
            .filter(|k| !k.is_empty())
            .ok_or(WeatherError::MissingApiKey)?;
        Self::with_api_key(base_url, api_key)
    }

    pub fn with_api_key(base_url: &str, api_key: impl Into<String>) -> Result<Self, WeatherError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn current(
        &self,
        lat: f64,
        lon: f64,
        units: Units,
    ) -> Result<CurrentConditions, WeatherError> {
        let body: ApiCurrentResponse = self.get("weather", lat, lon, units).await?;
        Ok(body.into())
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn forecast(&self, lat: f64, lon: f64, units: Units) -> Result<Forecast, WeatherError> {
        let body: ApiForecastResponse = self.get("forecast", lat, lon, units).await?;
        Ok(body.into())
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        lat: f64,
        lon: f64,
        units: Units,
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("units", units.as_str().to_string()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await?;

        Self::handle_response(endpoint, response).await
    }

    /// Helper to handle API responses and errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        endpoint: &str,
        response: reqwest::Response,
    ) -> Result<T, WeatherError> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(WeatherError::InvalidApiKey);
        }

        if status.is_success() {
            let text = response.text().await?;
            serde_json::from_str(&text).map_err(|e| {
                WeatherError::Network(NetworkError::InvalidResponse(format!(
                    "{}: {}",
                    endpoint, e
                )))
            })
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(WeatherError::Network(NetworkError::ServerError {
                status: status.as_u16(),
                message: text,
            }))
        }
    }
}

#[async_trait]
impl WeatherSource for WeatherProvider {
    #[instrument(skip(self), level = "info")]
    async fn fetch(&self, lat: f64, lon: f64, units: Units) -> Result<WeatherReport, WeatherError> {
        let (current, forecast) = tokio::try_join!(
            self.current(lat, lon, units),
            self.forecast(lat, lon, units)
        )?;
        tracing::debug!("Fetched weather with {} forecast slots", forecast.entries.len());
        Ok(WeatherReport { current, forecast })
    }
}
