//! Per-city weather cache.
//!
//! Entries are keyed by city id only. The unit system is not part of the key,
//! so a unit change must bypass this cache and re-fetch rather than read it.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ttl::TtlCache;
use crate::types::{CurrentConditions, Forecast, WeatherReport};

/// Age limit used when none is configured
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// Minimal summary shown in city list rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasicWeather {
    pub temp: Option<f64>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

impl BasicWeather {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Session-wide weather cache. Construct once and share it by `Arc`.
#[derive(Debug)]
pub struct WeatherCache {
    entries: TtlCache<String, WeatherReport>,
}

impl Default for WeatherCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl WeatherCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: TtlCache::new(ttl),
        }
    }

    pub fn get_weather(&self, city_id: &str) -> Option<WeatherReport> {
        let hit = self.entries.get(city_id);
        tracing::debug!(
            "Weather cache {} for {}",
            if hit.is_some() { "hit" } else { "miss" },
            city_id
        );
        hit
    }

    pub fn set_weather(&self, city_id: &str, current: CurrentConditions, forecast: Forecast) {
        self.entries
            .set(city_id.to_string(), WeatherReport { current, forecast });
    }

    /// Summary for list rows. Empty when nothing fresh is cached; never fetches.
    pub fn basic_summary(&self, city_id: &str) -> BasicWeather {
        let Some(cached) = self.entries.get(city_id) else {
            return BasicWeather::default();
        };

        let current = &cached.current;
        let condition = current.primary_condition();
        BasicWeather {
            temp: Some(current.temp),
            temp_min: Some(current.temp_min),
            temp_max: Some(current.temp_max),
            description: condition.map(|c| c.description.clone()),
            icon: condition.map(|c| c.icon.clone()),
        }
    }

    pub fn clear(&self) {
        self.entries.clear();
        tracing::info!("Weather cache cleared");
    }

    /// Stored entries, including expired ones not yet read
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
