use serde::{Deserialize, Serialize};

/// One entry of the provider's weather condition list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherCondition {
    pub id: i32,
    pub main: String,
    pub description: String,
    pub icon: String,
}

/// Current conditions for a coordinate pair, in the requested unit system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    /// hPa
    pub pressure: f64,
    /// Percent
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_deg: f64,
    /// Cloud cover, percent
    pub clouds: f64,
    /// Metres; the provider omits it in some conditions
    pub visibility: Option<f64>,
    pub conditions: Vec<WeatherCondition>,
    /// Unix seconds
    pub sunrise: i64,
    pub sunset: i64,
    pub observed_at: i64,
}

impl CurrentConditions {
    /// The condition the provider lists first
    pub fn primary_condition(&self) -> Option<&WeatherCondition> {
        self.conditions.first()
    }
}

/// One 3-hour forecast slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// Unix seconds
    pub timestamp: i64,
    pub temp: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub conditions: Vec<WeatherCondition>,
    /// Probability of precipitation, 0.0..=1.0
    pub pop: f64,
    pub daytime: bool,
}

/// Location metadata attached to a forecast response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastCity {
    pub name: String,
    pub country: String,
    /// Seconds east of UTC
    pub utc_offset_secs: i32,
    pub sunrise: i64,
    pub sunset: i64,
}

/// Ordered 3-hourly forecast
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Forecast {
    pub entries: Vec<ForecastEntry>,
    pub city: Option<ForecastCity>,
}

/// Current conditions and forecast fetched together for one city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub current: CurrentConditions,
    pub forecast: Forecast,
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct ApiCurrentResponse {
    pub main: ApiMain,
    pub wind: ApiWind,
    pub clouds: ApiClouds,
    pub visibility: Option<f64>,
    pub weather: Vec<WeatherCondition>,
    pub sys: ApiSys,
    pub dt: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiMain {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: f64,
    pub humidity: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiWind {
    pub speed: f64,
    #[serde(default)]
    pub deg: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiClouds {
    pub all: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiSys {
    pub sunrise: i64,
    pub sunset: i64,
}

impl From<ApiCurrentResponse> for CurrentConditions {
    fn from(r: ApiCurrentResponse) -> Self {
        Self {
            temp: r.main.temp,
            feels_like: r.main.feels_like,
            temp_min: r.main.temp_min,
            temp_max: r.main.temp_max,
            pressure: r.main.pressure,
            humidity: r.main.humidity,
            wind_speed: r.wind.speed,
            wind_deg: r.wind.deg,
            clouds: r.clouds.all,
            visibility: r.visibility,
            conditions: r.weather,
            sunrise: r.sys.sunrise,
            sunset: r.sys.sunset,
            observed_at: r.dt,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiForecastResponse {
    pub list: Vec<ApiForecastItem>,
    pub city: Option<ApiForecastCity>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiForecastItem {
    pub dt: i64,
    pub main: ApiForecastMain,
    pub weather: Vec<WeatherCondition>,
    #[serde(default)]
    pub pop: f64,
    #[serde(default)]
    pub sys: ApiPartOfDay,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiForecastMain {
    pub temp: f64,
    pub temp_min: f64,
    pub temp_max: f64,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiPartOfDay {
    /// `d` or `n`
    #[serde(default)]
    pub pod: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiForecastCity {
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub timezone: i32,
    #[serde(default)]
    pub sunrise: i64,
    #[serde(default)]
    pub sunset: i64,
}

impl From<ApiForecastResponse> for Forecast {
    fn from(r: ApiForecastResponse) -> Self {
        Self {
            entries: r
                .list
                .into_iter()
                .map(|item| ForecastEntry {
                    timestamp: item.dt,
                    temp: item.main.temp,
                    temp_min: item.main.temp_min,
                    temp_max: item.main.temp_max,
                    conditions: item.weather,
                    pop: item.pop,
                    daytime: item.sys.pod == "d",
                })
                .collect(),
            city: r.city.map(|c| ForecastCity {
                name: c.name,
                country: c.country,
                utc_offset_secs: c.timezone,
                sunrise: c.sunrise,
                sunset: c.sunset,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_response_conversion() {
        let raw: ApiCurrentResponse = serde_json::from_value(serde_json::json!({
            "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}],
            "main": {"temp": 21.3, "feels_like": 20.9, "temp_min": 19.0, "temp_max": 23.1,
                     "pressure": 1016, "humidity": 48},
            "visibility": 10000,
            "wind": {"speed": 3.6, "deg": 240},
            "clouds": {"all": 0},
            "dt": 1717430400,
            "sys": {"sunrise": 1717386000, "sunset": 1717443600}
        }))
        .unwrap();

        let current = CurrentConditions::from(raw);
        assert_eq!(current.temp, 21.3);
        assert_eq!(current.humidity, 48.0);
        assert_eq!(current.visibility, Some(10000.0));
        assert_eq!(current.observed_at, 1717430400);
        assert_eq!(current.primary_condition().map(|c| c.icon.as_str()), Some("01d"));
    }

    #[test]
    fn test_current_response_missing_main_is_rejected() {
        let raw = serde_json::from_value::<ApiCurrentResponse>(serde_json::json!({
            "weather": [],
            "dt": 1
        }));
        assert!(raw.is_err());
    }

    #[test]
    fn test_forecast_item_day_night_flag() {
        let raw: ApiForecastResponse = serde_json::from_value(serde_json::json!({
            "list": [
                {"dt": 1, "main": {"temp": 10.0, "temp_min": 9.0, "temp_max": 11.0},
                 "weather": [], "pop": 0.2, "sys": {"pod": "d"}},
                {"dt": 2, "main": {"temp": 5.0, "temp_min": 4.0, "temp_max": 6.0},
                 "weather": [], "sys": {"pod": "n"}}
            ],
            "city": {"name": "Paris", "country": "FR", "timezone": 7200}
        }))
        .unwrap();

        let forecast = Forecast::from(raw);
        assert!(forecast.entries[0].daytime);
        assert!(!forecast.entries[1].daytime);
        assert_eq!(forecast.entries[1].pop, 0.0);
        assert_eq!(forecast.city.map(|c| c.utc_offset_secs), Some(7200));
    }
}
