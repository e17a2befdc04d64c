//! Weather service for Skycast
//!
//! Provides current conditions and 3-hourly forecasts from the OpenWeather
//! API, a per-city TTL cache, and the daily forecast summary.

pub mod cache;
pub mod display;
pub mod error;
pub mod forecast;
pub mod provider;
pub mod ttl;
pub mod types;

pub use cache::{BasicWeather, WeatherCache};
pub use error::WeatherError;
pub use forecast::DailyForecast;
pub use provider::{WeatherProvider, WeatherSource};
pub use skycast_core::Units;
pub use ttl::TtlCache;
pub use types::*;
