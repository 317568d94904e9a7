//! `Clima` - short-term hourly forecasts for a fixed set of locations
//!
//! This library fetches the upstream hourly feed for every location, derives
//! the "now and later" series, raises threshold alerts, and scales any series
//! onto a fixed-size chart canvas for the presentation layer.

pub mod api;
pub mod chart;
pub mod config;
pub mod error;
pub mod location;
pub mod snapshot;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use chart::{ChartGeometry, ChartMode, ChartPoint, scale};
pub use crate::config::ClimaConfig;
pub use error::ClimaError;
pub use location::{Location, LocationRegistry};
pub use snapshot::{ForecastSnapshot, LocationSnapshot, ViewState, refresh, refresh_each};
pub use weather::{ForecastSource, OpenMeteoClient};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ClimaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
