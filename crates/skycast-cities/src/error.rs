//! City-search error types.

use skycast_core::{AppError, NetworkError, ReqwestErrorExt};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CityError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// The lookup returned no records at all.
    #[error("City not found: {0}")]
    NotFound(String),
}

impl From<reqwest::Error> for CityError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.into_network_error())
    }
}

impl From<CityError> for AppError {
    fn from(e: CityError) -> Self {
        match e {
            CityError::Network(n) => AppError::Network(n),
            CityError::NotFound(id) => AppError::NotFound(id),
        }
    }
}
