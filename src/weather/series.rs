//! Hourly series derivation
//!
//! Turns a raw forecast payload into the "now and later" hourly records and
//! the current-conditions summary shown for a location.

use super::condition::ConditionCategory;
use super::open_meteo::{self, ForecastResponse};
use crate::ClimaError;
use crate::chart::{ChartMode, ChartPoint};
use chrono::Timelike;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Number of leading hours plotted in the trend chart
pub const TREND_HOURS: usize = 12;

/// One derived hour of forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyRecord {
    /// Wall-clock hour (0-23) in the requested zone
    pub hour: u32,
    /// Display label, e.g. `14h`
    pub label: String,
    /// Temperature in °C, rounded
    pub temperature: i32,
    /// Relative humidity percentage
    pub humidity: u8,
    /// Precipitation probability percentage
    pub rain_probability: u8,
    /// Wind speed in km/h, rounded
    pub wind_speed: u32,
    pub weather_code: u8,
    pub condition: ConditionCategory,
    /// Icon key for `condition` at this hour
    pub icon: String,
    pub is_night: bool,
}

/// Snapshot of the conditions right now
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    pub temperature: i32,
    pub wind_speed: u32,
    pub rain_probability: u8,
    pub humidity: u8,
    pub weather_code: u8,
    pub condition: ConditionCategory,
    pub icon: String,
    pub is_night: bool,
}

/// Metric that can be plotted from an hourly series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartMetric {
    #[serde(alias = "temp")]
    Temperature,
    Rain,
    Wind,
    Humidity,
}

impl ChartMetric {
    /// Probabilities render as bars, continuous quantities as filled lines
    #[must_use]
    pub fn mode(self) -> ChartMode {
        match self {
            Self::Rain => ChartMode::Bar,
            Self::Temperature | Self::Wind | Self::Humidity => ChartMode::Area,
        }
    }

    #[must_use]
    pub fn unit(self) -> &'static str {
        match self {
            Self::Temperature => "°",
            Self::Rain | Self::Humidity => "%",
            Self::Wind => "km/h",
        }
    }

    #[must_use]
    pub fn value(self, record: &HourlyRecord) -> f64 {
        match self {
            Self::Temperature => f64::from(record.temperature),
            Self::Rain => f64::from(record.rain_probability),
            Self::Wind => f64::from(record.wind_speed),
            Self::Humidity => f64::from(record.humidity),
        }
    }
}

/// Night runs from 18h through 5h
#[must_use]
pub fn is_night(hour: u32) -> bool {
    hour >= 18 || hour < 6
}

#[must_use]
pub fn hour_label(hour: u32) -> String {
    format!("{hour}h")
}

/// Percentages must already lie in 0..=100; anything else is a bad payload
fn percent(field: &str, timestamp: &str, value: f64) -> Result<u8, ClimaError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(ClimaError::malformed(format!(
            "hourly.{field} at {timestamp} is {value}, expected 0..=100"
        )));
    }
    Ok(value.round() as u8)
}

fn round_speed(value: f64) -> u32 {
    value.round().max(0.0) as u32
}

/// Zip the hourly arrays and keep the records at or after `current_hour`.
///
/// Upstream order is kept as-is; a record whose hour does not advance past
/// the last kept one is dropped so that `hour` stays strictly increasing.
pub fn build_hourly_series(
    response: &ForecastResponse,
    current_hour: u32,
) -> Result<Vec<HourlyRecord>, ClimaError> {
    response.validate()?;
    let hourly = &response.hourly;

    let mut records: Vec<HourlyRecord> = Vec::with_capacity(hourly.time.len());

    for (i, timestamp) in hourly.time.iter().enumerate() {
        let hour = open_meteo::parse_timestamp(timestamp)?.hour();
        if hour < current_hour {
            continue;
        }

        if let Some(last) = records.last() {
            if hour <= last.hour {
                warn!(
                    "Dropping out-of-order timestamp {} (hour {} after {})",
                    timestamp, hour, last.hour
                );
                continue;
            }
        }

        let weather_code = hourly.weather_code[i];
        let condition = ConditionCategory::from_wmo_code(weather_code);
        let night = is_night(hour);
        records.push(HourlyRecord {
            hour,
            label: hour_label(hour),
            temperature: hourly.temperature[i].round() as i32,
            humidity: percent("relative_humidity_2m", timestamp, hourly.humidity[i])?,
            rain_probability: percent(
                "precipitation_probability",
                timestamp,
                hourly.precipitation_probability[i],
            )?,
            wind_speed: round_speed(hourly.wind_speed[i]),
            weather_code,
            condition,
            icon: condition.icon_key(night).to_string(),
            is_night: night,
        });
    }

    debug!(
        "Kept {} of {} hourly entries from hour {}",
        records.len(),
        hourly.time.len(),
        current_hour
    );

    Ok(records)
}

/// Combine the upstream current block with the first retained hour
#[must_use]
pub fn derive_current(
    response: &ForecastResponse,
    hourly: &[HourlyRecord],
    current_hour: u32,
) -> CurrentConditions {
    let current = &response.current_weather;
    let first = hourly.first();
    let condition = ConditionCategory::from_wmo_code(current.weather_code);
    let night = is_night(current_hour);

    CurrentConditions {
        temperature: current.temperature.round() as i32,
        wind_speed: round_speed(current.wind_speed),
        rain_probability: first.map_or(0, |h| h.rain_probability),
        humidity: first.map_or(0, |h| h.humidity),
        weather_code: current.weather_code,
        condition,
        icon: condition.icon_key(night).to_string(),
        is_night: night,
    }
}

/// Trend-window series of `metric`, labelled by hour
#[must_use]
pub fn chart_series(hourly: &[HourlyRecord], metric: ChartMetric) -> Vec<ChartPoint> {
    hourly
        .iter()
        .take(TREND_HOURS)
        .map(|record| ChartPoint::new(record.label.clone(), metric.value(record)))
        .collect()
}
