//! Controllers for Skycast views.
//!
//! `CitySearchController` keeps a paginated search result in step with the
//! latest search parameters. `CityWeatherController` serves one city's
//! weather from the shared cache or the network. Both publish their state
//! through a `tokio::sync::watch` channel and never return errors: failures
//! become a user-facing message in the state.

pub mod city_search;
pub mod city_weather;
pub mod debounce;
pub mod search_state;

pub use city_search::CitySearchController;
pub use city_weather::{CityWeatherController, WeatherViewState};
pub use debounce::Debouncer;
pub use search_state::SearchPageState;
