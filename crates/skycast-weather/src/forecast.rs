//! Daily summary of the 3-hourly forecast.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Forecast, ForecastEntry};

/// Days shown in the multi-day forecast
pub const MAX_FORECAST_DAYS: usize = 5;

const DEFAULT_ICON: &str = "01d";
const DEFAULT_DESCRIPTION: &str = "unknown";

/// One calendar day folded from its 3-hour slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub temp_min: f64,
    pub temp_max: f64,
    /// Highest slot probability of precipitation
    pub pop: f64,
    pub icon: String,
    pub description: String,
}

impl Forecast {
    /// Daily summaries after `now`'s calendar day, in the forecast city's
    /// local time (UTC when the response carried no offset).
    pub fn daily(&self, now: DateTime<Utc>) -> Vec<DailyForecast> {
        let offset = self
            .city
            .as_ref()
            .and_then(|c| FixedOffset::east_opt(c.utc_offset_secs))
            .unwrap_or_else(|| Utc.fix());
        group_daily(&self.entries, now, offset)
    }
}

/// Group forecast slots by calendar day in `offset`, skipping the day that
/// contains `now`, and keep the first [`MAX_FORECAST_DAYS`] days.
///
/// Temperatures and precipitation take the extremes of the day. Icon and
/// description come from the day's first slot and are overwritten by each
/// daytime slot in turn.
pub fn group_daily(
    entries: &[ForecastEntry],
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Vec<DailyForecast> {
    let today = now.with_timezone(&offset).date_naive();
    let mut days: BTreeMap<NaiveDate, DailyForecast> = BTreeMap::new();

    for entry in entries {
        let Some(at) = DateTime::from_timestamp(entry.timestamp, 0) else {
            continue;
        };
        let date = at.with_timezone(&offset).date_naive();
        if date == today {
            continue;
        }

        let condition = entry.conditions.first();
        let day = days.entry(date).or_insert_with(|| DailyForecast {
            date,
            temp_min: f64::INFINITY,
            temp_max: f64::NEG_INFINITY,
            pop: entry.pop,
            icon: condition.map_or(DEFAULT_ICON, |c| c.icon.as_str()).to_string(),
            description: condition
                .map_or(DEFAULT_DESCRIPTION, |c| c.description.as_str())
                .to_string(),
        });

        day.temp_min = day.temp_min.min(entry.temp_min);
        day.temp_max = day.temp_max.max(entry.temp_max);
        day.pop = day.pop.max(entry.pop);

        if entry.daytime {
            if let Some(c) = condition {
                day.icon = c.icon.clone();
                day.description = c.description.clone();
            }
        }
    }

    days.into_values().take(MAX_FORECAST_DAYS).collect()
}
