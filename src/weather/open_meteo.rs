//! `OpenMeteo` forecast payload and request construction

use crate::ClimaError;
use crate::location::Location;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Hourly variables requested for every location
pub const HOURLY_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,precipitation_probability,wind_speed_10m,weather_code";

/// Forecast horizon in days
pub const FORECAST_DAYS: u8 = 1;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Raw forecast response from the `OpenMeteo` API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub timezone: Option<String>,
    pub current_weather: CurrentWeather,
    pub hourly: HourlyData,
}

/// `current_weather=true` block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature: f64,
    #[serde(rename = "windspeed")]
    pub wind_speed: f64,
    #[serde(rename = "weathercode")]
    pub weather_code: u8,
}

/// Parallel arrays, one entry per hour of the horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyData {
    pub time: Vec<String>,
    #[serde(rename = "temperature_2m")]
    pub temperature: Vec<f64>,
    #[serde(rename = "relative_humidity_2m")]
    pub humidity: Vec<f64>,
    pub precipitation_probability: Vec<f64>,
    #[serde(rename = "wind_speed_10m")]
    pub wind_speed: Vec<f64>,
    pub weather_code: Vec<u8>,
}

impl ForecastResponse {
    /// Parse and validate an upstream body
    pub fn from_json(body: &str) -> Result<Self, ClimaError> {
        let response: ForecastResponse = serde_json::from_str(body)?;
        response.validate()?;
        Ok(response)
    }

    /// Check that every hourly array lines up with `time`
    pub fn validate(&self) -> Result<(), ClimaError> {
        let hourly = &self.hourly;
        let expected = hourly.time.len();
        let lengths = [
            ("temperature_2m", hourly.temperature.len()),
            ("relative_humidity_2m", hourly.humidity.len()),
            ("precipitation_probability", hourly.precipitation_probability.len()),
            ("wind_speed_10m", hourly.wind_speed.len()),
            ("weather_code", hourly.weather_code.len()),
        ];

        for (name, len) in lengths {
            if len != expected {
                return Err(ClimaError::malformed(format!(
                    "hourly.{name} has {len} entries, expected {expected}"
                )));
            }
        }

        Ok(())
    }

    /// Timestamps are only meaningful in the zone that was requested
    pub fn ensure_timezone(&self, requested: &str) -> Result<(), ClimaError> {
        match self.timezone.as_deref() {
            Some(zone) if zone != requested => Err(ClimaError::malformed(format!(
                "forecast localized to {zone}, requested {requested}"
            ))),
            _ => Ok(()),
        }
    }
}

/// Build the forecast URL for one location
#[must_use]
pub fn forecast_url(base_url: &str, location: &Location, timezone: &str) -> String {
    format!(
        "{}/forecast?latitude={}&longitude={}&hourly={}&current_weather=true&timezone={}&forecast_days={}",
        base_url.trim_end_matches('/'),
        location.latitude,
        location.longitude,
        HOURLY_FIELDS,
        urlencoding::encode(timezone),
        FORECAST_DAYS
    )
}

/// Parse an hourly timestamp as wall-clock time in the requested zone
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, ClimaError> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map_err(|e| ClimaError::malformed(format!("invalid timestamp '{value}': {e}")))
}
