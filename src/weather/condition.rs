//! Weather code classification
//!
//! Collapses WMO weather codes into the small set of categories the
//! presentation layer draws, independently of how each one is rendered.

use serde::{Deserialize, Serialize};

/// Condition categories mapped from WMO codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionCategory {
    Clear,
    PartlyCloudy,
    Cloudy,
    Rain,
}

impl ConditionCategory {
    /// Total mapping from WMO code to category.
    /// See: https://open-meteo.com/en/docs#weathervariables
    #[must_use]
    pub fn from_wmo_code(code: u8) -> Self {
        match code {
            0 => Self::Clear,
            1..=3 => Self::PartlyCloudy,
            51.. => Self::Rain,
            // fog, haze and anything else below the drizzle range
            _ => Self::Cloudy,
        }
    }

    /// Stable icon key; only clear skies differ between day and night
    #[must_use]
    pub fn icon_key(self, is_night: bool) -> &'static str {
        match self {
            Self::Clear if is_night => "clear-night",
            Self::Clear => "clear-day",
            Self::PartlyCloudy => "partly-cloudy",
            Self::Cloudy => "cloudy",
            Self::Rain => "rain",
        }
    }
}
