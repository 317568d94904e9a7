//! Threshold alerts over a location's retained hourly window

use super::series::HourlyRecord;
use serde::{Deserialize, Serialize};

/// Wind speed (km/h) at or above which a wind alert is raised
pub const WIND_ALERT_KMH: u32 = 25;

/// Rain probability (%) at or above which a rain alert is raised
pub const RAIN_ALERT_PERCENT: u8 = 50;

/// Hours of the day (inclusive) flagged for high UV
pub const UV_ALERT_HOURS: std::ops::RangeInclusive<u32> = 10..=15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Wind,
    Rain,
    Uv,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub kind: AlertKind,
    pub message: String,
    /// Triggering value (max wind km/h or max rain %); none for UV
    pub value: Option<u32>,
}

impl AlertRecord {
    fn wind(max_wind: u32) -> Self {
        Self {
            kind: AlertKind::Wind,
            message: format!("Strong wind: {max_wind} km/h"),
            value: Some(max_wind),
        }
    }

    fn rain(max_rain: u8) -> Self {
        Self {
            kind: AlertKind::Rain,
            message: format!("Rain: {max_rain}%"),
            value: Some(u32::from(max_rain)),
        }
    }

    fn uv() -> Self {
        Self {
            kind: AlertKind::Uv,
            message: "High UV index".to_string(),
            value: None,
        }
    }
}

/// Evaluate the wind, rain and UV rules, in that order.
///
/// Wind and rain look at the maximum over the whole window. UV is a
/// time-of-day heuristic and ignores the data.
#[must_use]
pub fn evaluate_alerts(hourly: &[HourlyRecord], current_hour: u32) -> Vec<AlertRecord> {
    let mut alerts = Vec::new();

    if let Some(max_wind) = hourly.iter().map(|h| h.wind_speed).max() {
        if max_wind >= WIND_ALERT_KMH {
            alerts.push(AlertRecord::wind(max_wind));
        }
    }

    if let Some(max_rain) = hourly.iter().map(|h| h.rain_probability).max() {
        if max_rain >= RAIN_ALERT_PERCENT {
            alerts.push(AlertRecord::rain(max_rain));
        }
    }

    if UV_ALERT_HOURS.contains(&current_hour) {
        alerts.push(AlertRecord::uv());
    }

    alerts
}
