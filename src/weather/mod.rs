//! Weather domain: upstream payloads, fetching, hourly derivation and alerts

pub mod alerts;
pub mod condition;
pub mod fetcher;
pub mod open_meteo;
pub mod series;

pub use alerts::{AlertKind, AlertRecord, evaluate_alerts};
pub use condition::ConditionCategory;
pub use fetcher::{ForecastSource, OpenMeteoClient, fetch_all};
pub use open_meteo::ForecastResponse;
pub use series::{
    ChartMetric, CurrentConditions, HourlyRecord, build_hourly_series, chart_series,
    derive_current, is_night,
};
