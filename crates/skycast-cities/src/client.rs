//! City records search API client.

use std::time::Duration;

use async_trait::async_trait;
use skycast_core::{CitiesConfig, NetworkError};
use tracing::instrument;

use crate::city_id::decode_city_id;
use crate::error::CityError;
use crate::types::{ApiSearchResponse, City, CityPage, SearchParams};

const REQUEST_TIMEOUT_SECS: u64 = 10;
const LOOKUP_ROWS: u32 = 10;

/// Remote city data as seen by the controllers.
#[async_trait]
pub trait CitySource: Send + Sync {
    /// Fetch one page of results for `params`.
    async fn search(&self, params: &SearchParams) -> Result<CityPage, CityError>;

    /// Resolve a city id back to its record.
    async fn lookup(&self, city_id: &str) -> Result<City, CityError>;
}

pub struct CityClient {
    client: reqwest::Client,
    base_url: String,
    dataset: String,
}

impl CityClient {
    pub fn new(config: &CitiesConfig) -> Result<Self, CityError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            dataset: config.dataset.clone(),
        })
    }

    async fn fetch_page(&self, params: &SearchParams) -> Result<CityPage, CityError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&params.query_pairs(&self.dataset))
            .send()
            .await?;

        let body: ApiSearchResponse = Self::handle_response(response).await?;
        Ok(CityPage {
            cities: body.records.into_iter().map(City::from).collect(),
            total: body.nhits,
        })
    }

    /// Helper to handle API responses and errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, CityError> {
        let status = response.status();

        if status.is_success() {
            let text = response.text().await?;
            serde_json::from_str(&text).map_err(|e| {
                CityError::Network(NetworkError::InvalidResponse(format!(
                    "city search: {}",
                    e
                )))
            })
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(CityError::Network(NetworkError::ServerError {
                status: status.as_u16(),
                message: text,
            }))
        }
    }
}

#[async_trait]
impl CitySource for CityClient {
    #[instrument(skip(self), level = "info")]
    async fn search(&self, params: &SearchParams) -> Result<CityPage, CityError> {
        let page = self.fetch_page(params).await?;
        tracing::debug!(
            "City search returned {} of {} records",
            page.cities.len(),
            page.total
        );
        Ok(page)
    }

    #[instrument(skip(self), level = "info")]
    async fn lookup(&self, city_id: &str) -> Result<City, CityError> {
        let parts = decode_city_id(city_id);

        let mut params = SearchParams::new(LOOKUP_ROWS);
        params.query = Some(parts.name);

        let page = self.fetch_page(&params).await?;

        // Exact record first, otherwise the best text match
        let mut cities = page.cities;
        let exact = cities.iter().position(|c| c.record_id == parts.record_id);

        match exact {
            Some(index) => Ok(cities.swap_remove(index)),
            None if !cities.is_empty() => {
                tracing::debug!("No exact record for {}, using first match", city_id);
                Ok(cities.swap_remove(0))
            }
            None => Err(CityError::NotFound(city_id.to_string())),
        }
    }
}
