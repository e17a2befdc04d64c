//! Weather for a single city view.
//!
//! Reads go through the shared [`WeatherCache`]. The cache key does not
//! include the unit system, so a unit toggle always fetches from the network
//! and overwrites the entry.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use skycast_cities::{City, CitySource};
use skycast_core::{AppError, Units};
use skycast_weather::{
    CurrentConditions, DailyForecast, Forecast, WeatherCache, WeatherReport, WeatherSource,
};
use tokio::sync::watch;

/// What a city weather view renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherViewState {
    /// Resolved record, known after the first network fetch
    pub city: Option<City>,
    pub current: Option<CurrentConditions>,
    pub forecast: Option<Forecast>,
    /// Unit system the displayed values were requested in. A cache hit may
    /// hold values another view fetched in the other system, since the cache
    /// key has no unit; `toggle_units` or `retry` re-fetches in this one.
    pub units: Units,
    pub loading: bool,
    pub error: Option<String>,
}

struct Cursor {
    /// Requested unit system; can run ahead of the displayed one
    units: Units,
    generation: u64,
}

pub struct CityWeatherController {
    city_id: String,
    cities: Arc<dyn CitySource>,
    weather: Arc<dyn WeatherSource>,
    cache: Arc<WeatherCache>,
    cursor: Mutex<Cursor>,
    state: watch::Sender<WeatherViewState>,
}

impl CityWeatherController {
    pub fn new(
        city_id: impl Into<String>,
        units: Units,
        cities: Arc<dyn CitySource>,
        weather: Arc<dyn WeatherSource>,
        cache: Arc<WeatherCache>,
    ) -> Self {
        let (state, _) = watch::channel(WeatherViewState {
            units,
            ..WeatherViewState::default()
        });
        Self {
            city_id: city_id.into(),
            cities,
            weather,
            cache,
            cursor: Mutex::new(Cursor {
                units,
                generation: 0,
            }),
            state,
        }
    }

    pub fn city_id(&self) -> &str {
        &self.city_id
    }

    /// Requested unit system
    pub fn units(&self) -> Units {
        self.cursor.lock().units
    }

    pub fn state(&self) -> WeatherViewState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WeatherViewState> {
        self.state.subscribe()
    }

    /// Daily summaries of the displayed forecast, days after `now`.
    pub fn daily(&self, now: DateTime<Utc>) -> Vec<DailyForecast> {
        self.state
            .borrow()
            .forecast
            .as_ref()
            .map(|f| f.daily(now))
            .unwrap_or_default()
    }

    /// Show cached weather if fresh, otherwise fetch it.
    pub async fn load(&self) {
        if let Some(report) = self.cache.get_weather(&self.city_id) {
            // Supersede any fetch still in flight
            let mut cursor = self.cursor.lock();
            cursor.generation += 1;
            let units = cursor.units;
            self.state.send_modify(|state| {
                state.current = Some(report.current);
                state.forecast = Some(report.forecast);
                state.units = units;
                state.loading = false;
                state.error = None;
            });
            return;
        }

        self.fetch().await;
    }

    /// Switch metric/imperial and re-fetch, ignoring the cache.
    pub async fn toggle_units(&self) {
        let units = {
            let mut cursor = self.cursor.lock();
            cursor.units = cursor.units.toggled();
            cursor.units
        };
        tracing::info!("Units switched to {} for {}", units, self.city_id);
        self.fetch().await;
    }

    /// Fetch again from the network for the requested unit system.
    pub async fn retry(&self) {
        self.fetch().await;
    }

    async fn fetch(&self) {
        let (units, generation) = {
            let mut cursor = self.cursor.lock();
            cursor.generation += 1;
            (cursor.units, cursor.generation)
        };
        self.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });

        let result = self.fetch_remote(units).await;

        let cursor = self.cursor.lock();
        if cursor.generation != generation {
            tracing::debug!("Discarding superseded weather for {}", self.city_id);
            return;
        }

        match result {
            Ok((city, report)) => {
                self.cache.set_weather(
                    &self.city_id,
                    report.current.clone(),
                    report.forecast.clone(),
                );
                self.state.send_modify(|state| {
                    state.city = Some(city);
                    state.current = Some(report.current);
                    state.forecast = Some(report.forecast);
                    state.units = units;
                    state.loading = false;
                    state.error = None;
                });
            }
            Err(e) => {
                tracing::warn!("Weather for {} failed: {}", self.city_id, e);
                let message = e.user_message();
                self.state.send_modify(|state| {
                    state.loading = false;
                    state.error = Some(message.to_string());
                });
            }
        }
    }

    async fn fetch_remote(&self, units: Units) -> Result<(City, WeatherReport), AppError> {
        let city = self.cities.lookup(&self.city_id).await?;
        let report = self
            .weather
            .fetch(city.latitude, city.longitude, units)
            .await?;
        Ok((city, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use skycast_cities::{CityError, CityPage, SearchParams};
    use skycast_core::NetworkError;
    use skycast_weather::{ForecastEntry, WeatherCondition, WeatherError};
    use std::time::Duration;

    const CITY_ID: &str = "paris-2988507";

    struct FakeCities {
        missing: bool,
    }

    #[async_trait]
    impl CitySource for FakeCities {
        async fn search(&self, _params: &SearchParams) -> Result<CityPage, CityError> {
            Ok(CityPage {
                cities: Vec::new(),
                total: 0,
            })
        }

        async fn lookup(&self, city_id: &str) -> Result<City, CityError> {
            if self.missing {
                return Err(CityError::NotFound(city_id.to_string()));
            }
            Ok(City {
                id: city_id.to_string(),
                record_id: "2988507".into(),
                name: "Paris".into(),
                country: "France".into(),
                population: 2_138_551,
                latitude: 48.85341,
                longitude: 2.3488,
                timezone: "Europe/Paris".into(),
                admin1: Some("Île-de-France".into()),
                admin2: None,
                elevation: None,
            })
        }
    }

    /// Returns 20° metric or 68° imperial after a per-unit delay.
    #[derive(Default)]
    struct FakeWeather {
        fail: Mutex<bool>,
        imperial_delay: Duration,
        calls: Mutex<Vec<Units>>,
    }

    impl FakeWeather {
        fn calls(&self) -> Vec<Units> {
            self.calls.lock().clone()
        }
    }

    fn conditions(temp: f64) -> CurrentConditions {
        CurrentConditions {
            temp,
            feels_like: temp,
            temp_min: temp - 1.0,
            temp_max: temp + 1.0,
            pressure: 1015.0,
            humidity: 50.0,
            wind_speed: 3.0,
            wind_deg: 90.0,
            clouds: 0.0,
            visibility: Some(10000.0),
            conditions: vec![WeatherCondition {
                id: 800,
                main: "Clear".into(),
                description: "clear sky".into(),
                icon: "01d".into(),
            }],
            sunrise: 0,
            sunset: 0,
            observed_at: 0,
        }
    }

    #[async_trait]
    impl WeatherSource for FakeWeather {
        async fn fetch(
            &self,
            _lat: f64,
            _lon: f64,
            units: Units,
        ) -> Result<WeatherReport, WeatherError> {
            self.calls.lock().push(units);
            if units == Units::Imperial {
                tokio::time::sleep(self.imperial_delay).await;
            }
            if *self.fail.lock() {
                return Err(WeatherError::Network(NetworkError::ConnectionFailed(
                    "refused".into(),
                )));
            }
            let temp = match units {
                Units::Metric => 20.0,
                Units::Imperial => 68.0,
            };
            Ok(WeatherReport {
                current: conditions(temp),
                forecast: Forecast::default(),
            })
        }
    }

    fn controller(
        weather: Arc<FakeWeather>,
        cache: Arc<WeatherCache>,
    ) -> CityWeatherController {
        CityWeatherController::new(
            CITY_ID,
            Units::Metric,
            Arc::new(FakeCities { missing: false }),
            weather,
            cache,
        )
    }

    fn temp(view: &CityWeatherController) -> Option<f64> {
        view.state().current.map(|c| c.temp)
    }

    #[tokio::test(start_paused = true)]
    async fn test_miss_fetches_and_fills_cache() {
        let weather = Arc::new(FakeWeather::default());
        let cache = Arc::new(WeatherCache::default());
        let view = controller(weather.clone(), cache.clone());

        view.load().await;

        assert_eq!(weather.calls(), vec![Units::Metric]);
        assert_eq!(temp(&view), Some(20.0));
        let state = view.state();
        assert!(!state.loading);
        assert_eq!(state.city.map(|c| c.name), Some("Paris".to_string()));
        assert_eq!(cache.basic_summary(CITY_ID).temp, Some(20.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_cache_skips_network() {
        let weather = Arc::new(FakeWeather::default());
        let cache = Arc::new(WeatherCache::default());
        cache.set_weather(CITY_ID, conditions(17.5), Forecast::default());
        let view = controller(weather.clone(), cache);

        view.load().await;

        assert!(weather.calls().is_empty());
        assert_eq!(temp(&view), Some(17.5));
        assert!(!view.state().loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_cache_refetches() {
        let weather = Arc::new(FakeWeather::default());
        let cache = Arc::new(WeatherCache::default());
        cache.set_weather(CITY_ID, conditions(17.5), Forecast::default());
        tokio::time::advance(Duration::from_secs(31 * 60)).await;

        let view = controller(weather.clone(), cache);
        view.load().await;

        assert_eq!(weather.calls().len(), 1);
        assert_eq!(temp(&view), Some(20.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_units_bypasses_fresh_cache() {
        let weather = Arc::new(FakeWeather::default());
        let cache = Arc::new(WeatherCache::default());
        cache.set_weather(CITY_ID, conditions(20.0), Forecast::default());
        let view = controller(weather.clone(), cache.clone());
        view.load().await;
        assert!(weather.calls().is_empty());

        view.toggle_units().await;

        assert_eq!(weather.calls(), vec![Units::Imperial]);
        let state = view.state();
        assert_eq!(state.units, Units::Imperial);
        assert_eq!(state.current.map(|c| c.temp), Some(68.0));
        assert_eq!(
            cache.get_weather(CITY_ID).map(|w| w.current.temp),
            Some(68.0)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_hit_reports_requested_units() {
        let weather = Arc::new(FakeWeather::default());
        let cache = Arc::new(WeatherCache::default());

        let imperial_view = controller(weather.clone(), cache.clone());
        imperial_view.toggle_units().await;
        assert_eq!(imperial_view.state().units, Units::Imperial);

        // Same city, metric view: served from the entry written in imperial
        let metric_view = controller(weather.clone(), cache);
        metric_view.load().await;
        let state = metric_view.state();
        assert_eq!(weather.calls(), vec![Units::Imperial]);
        assert_eq!(state.units, Units::Metric);
        assert_eq!(state.current.map(|c| c.temp), Some(68.0));

        metric_view.retry().await;
        assert_eq!(temp(&metric_view), Some(20.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_prior_data() {
        let weather = Arc::new(FakeWeather::default());
        let view = controller(weather.clone(), Arc::new(WeatherCache::default()));
        view.load().await;

        *weather.fail.lock() = true;
        view.toggle_units().await;

        let state = view.state();
        assert_eq!(state.current.map(|c| c.temp), Some(20.0));
        assert_eq!(state.units, Units::Metric);
        assert_eq!(view.units(), Units::Imperial);
        assert!(!state.loading);
        assert_eq!(
            state.error.as_deref(),
            Some("Unable to connect. Check your internet connection.")
        );

        *weather.fail.lock() = false;
        view.retry().await;
        let state = view.state();
        assert!(state.error.is_none());
        assert_eq!(state.units, Units::Imperial);
        assert_eq!(state.current.map(|c| c.temp), Some(68.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_city_reports_not_found() {
        let weather = Arc::new(FakeWeather::default());
        let view = CityWeatherController::new(
            "atlantis-0",
            Units::Metric,
            Arc::new(FakeCities { missing: true }),
            weather.clone(),
            Arc::new(WeatherCache::default()),
        );

        view.load().await;

        assert!(weather.calls().is_empty());
        let state = view.state();
        assert_eq!(state.error.as_deref(), Some("City not found."));
        assert!(state.current.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_fetch_is_neither_shown_nor_cached() {
        let weather = Arc::new(FakeWeather {
            imperial_delay: Duration::from_millis(500),
            ..FakeWeather::default()
        });
        let cache = Arc::new(WeatherCache::default());
        let view = controller(weather.clone(), cache.clone());

        // Imperial request is slow; toggling back issues a faster metric one
        tokio::join!(view.toggle_units(), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            view.toggle_units().await;
        });

        assert_eq!(weather.calls(), vec![Units::Imperial, Units::Metric]);
        let state = view.state();
        assert_eq!(state.units, Units::Metric);
        assert_eq!(state.current.map(|c| c.temp), Some(20.0));
        assert_eq!(
            cache.get_weather(CITY_ID).map(|w| w.current.temp),
            Some(20.0)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_daily_uses_displayed_forecast() {
        let view = controller(
            Arc::new(FakeWeather::default()),
            Arc::new(WeatherCache::default()),
        );
        let now = Utc.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap();
        assert!(view.daily(now).is_empty());

        let tomorrow = Utc.with_ymd_and_hms(2024, 6, 4, 12, 0, 0).unwrap();
        let forecast = Forecast {
            entries: vec![ForecastEntry {
                timestamp: tomorrow.timestamp(),
                temp: 22.0,
                temp_min: 18.0,
                temp_max: 25.0,
                conditions: Vec::new(),
                pop: 0.4,
                daytime: true,
            }],
            city: None,
        };
        view.cache
            .set_weather(CITY_ID, conditions(20.0), forecast);
        view.load().await;

        let days = view.daily(now);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].temp_max, 25.0);
    }
}
