//! Formatting helpers for weather values.

use skycast_core::Units;

const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

/// Icon image size multiplier offered by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IconSize {
    #[default]
    X2,
    X4,
}

/// Image URL for a provider icon code such as `10d`
pub fn icon_url(code: &str, size: IconSize) -> String {
    let factor = match size {
        IconSize::X2 => 2,
        IconSize::X4 => 4,
    };
    format!("{}/{}@{}x.png", ICON_BASE_URL, code, factor)
}

/// Rounded temperature with unit symbol, e.g. `21°C`.
///
/// Halves round toward positive infinity and negative zero prints as `0`.
pub fn format_temperature(temp: f64, units: Units) -> String {
    let rounded = (temp + 0.5).floor() + 0.0;
    format!("{}{}", rounded, units.temperature_symbol())
}

/// Wind speed to one decimal, e.g. `3.6 m/s`
pub fn format_wind_speed(speed: f64, units: Units) -> String {
    format!("{:.1} {}", speed, units.speed_label())
}
