use std::sync::Arc;

use anyhow::{Context, Result};
use skycast_cities::CityClient;
use skycast_core::Config;
use skycast_services::{CitySearchController, CityWeatherController};
use skycast_weather::display::{format_temperature, format_wind_speed};
use skycast_weather::{WeatherCache, WeatherProvider};

const USAGE: &str = "usage: skycast [--imperial] <city name>";

#[tokio::main]
async fn main() -> Result<()> {
    skycast_core::init()?;

    let mut imperial = false;
    let mut words = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--imperial" => imperial = true,
            "-h" | "--help" => {
                println!("{}", USAGE);
                return Ok(());
            }
            _ => words.push(arg),
        }
    }
    let query = words.join(" ");
    if query.trim().is_empty() {
        anyhow::bail!(USAGE);
    }

    let (config, _) = Config::load_validated()?;
    let units = if imperial {
        skycast_core::Units::Imperial
    } else {
        config.weather.units
    };

    let cities = Arc::new(CityClient::new(&config.cities).context("Failed to build city client")?);
    let provider =
        Arc::new(WeatherProvider::new(&config.weather).context("Failed to build weather client")?);
    let cache = Arc::new(WeatherCache::new(config.weather.cache_ttl()));

    tracing::info!("Skycast started");

    // Search
    let search = CitySearchController::from_config(cities.clone(), &config);
    let mut updates = search.subscribe();
    search.set_query(query.clone());
    loop {
        updates.changed().await?;
        if !updates.borrow_and_update().loading {
            break;
        }
    }

    let results = search.state();
    if let Some(message) = &results.error {
        anyhow::bail!("{}", message);
    }
    println!(
        "{} result(s) for \"{}\", showing {}",
        results.total_count,
        query,
        results.items.len()
    );
    for city in &results.items {
        let summary = cache.basic_summary(&city.id);
        let temp = summary
            .temp
            .map(|t| format_temperature(t, units))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<32} {:<24} pop {:>10}  {}",
            city.name, city.country, city.population, temp
        );
    }

    let Some(first) = results.items.first() else {
        return Ok(());
    };

    // Weather for the best match
    let view = CityWeatherController::new(first.id.clone(), units, cities, provider, cache);
    view.load().await;

    let state = view.state();
    if let Some(message) = &state.error {
        anyhow::bail!("{}", message);
    }

    println!("\n{}, {}", first.name, first.country);
    if let Some(current) = &state.current {
        let description = current
            .primary_condition()
            .map(|c| c.description.as_str())
            .unwrap_or("unknown");
        println!(
            "  now {} (feels like {}), {}",
            format_temperature(current.temp, state.units),
            format_temperature(current.feels_like, state.units),
            description
        );
        println!(
            "  wind {}, humidity {}%",
            format_wind_speed(current.wind_speed, state.units),
            current.humidity
        );
    }

    for day in view.daily(chrono::Utc::now()) {
        println!(
            "  {}  {:>6} / {:<6} {:>3.0}% rain  {}",
            day.date.format("%a %d %b"),
            format_temperature(day.temp_min, state.units),
            format_temperature(day.temp_max, state.units),
            day.pop * 100.0,
            day.description
        );
    }

    Ok(())
}
