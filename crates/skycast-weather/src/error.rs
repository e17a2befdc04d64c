//! Weather provider error types.

use skycast_core::{AppError, ConfigError, NetworkError, ReqwestErrorExt};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// The provider answered 401.
    #[error("Weather API key was rejected")]
    InvalidApiKey,

    #[error("No weather API key configured")]
    MissingApiKey,
}

impl From<reqwest::Error> for WeatherError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.into_network_error())
    }
}

impl From<WeatherError> for AppError {
    fn from(e: WeatherError) -> Self {
        match e {
            WeatherError::Network(n) => AppError::Network(n),
            WeatherError::InvalidApiKey => {
                AppError::Config(ConfigError::Invalid("weather.api_key rejected".into()))
            }
            WeatherError::MissingApiKey => {
                AppError::Config(ConfigError::MissingSetting("weather.api_key".into()))
            }
        }
    }
}
