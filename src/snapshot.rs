//! Forecast snapshots
//!
//! A refresh fetches every location, derives its hourly series and alerts,
//! and produces a brand-new immutable [`ForecastSnapshot`]. Nothing is ever
//! patched in place; [`ViewState`] decides what the presentation layer sees
//! when a refresh fails.

use crate::ClimaError;
use crate::location::{Location, LocationRegistry};
use crate::weather::{
    AlertRecord, CurrentConditions, ForecastResponse, ForecastSource, HourlyRecord,
    build_hourly_series, derive_current, evaluate_alerts, fetch_all,
};
use chrono::{DateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, instrument, warn};

/// Everything derived for one location in one refresh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSnapshot {
    pub location: Location,
    pub current: CurrentConditions,
    pub hourly: Vec<HourlyRecord>,
    pub alerts: Vec<AlertRecord>,
}

impl LocationSnapshot {
    /// Derive the snapshot for one location from its raw payload
    pub fn build(
        location: Location,
        response: &ForecastResponse,
        current_hour: u32,
    ) -> Result<Self, ClimaError> {
        let hourly = build_hourly_series(response, current_hour)?;
        let current = derive_current(response, &hourly, current_hour);
        let alerts = evaluate_alerts(&hourly, current_hour);

        Ok(Self {
            location,
            current,
            hourly,
            alerts,
        })
    }
}

/// Result of one complete refresh, keyed by location id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastSnapshot {
    pub generated_at: DateTime<Utc>,
    /// Wall-clock hour in the requested zone when the refresh ran
    pub current_hour: u32,
    pub locations: BTreeMap<String, LocationSnapshot>,
}

impl ForecastSnapshot {
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&LocationSnapshot> {
        self.locations.get(id)
    }
}

/// Per-location outcome of a refresh
pub type LocationResults = BTreeMap<String, Result<LocationSnapshot, ClimaError>>;

/// Fetch and derive every location, keeping each failure next to its id
#[instrument(skip(source, registry, now), fields(hour = now.hour()))]
pub async fn refresh_each<Tz>(
    source: &dyn ForecastSource,
    registry: &LocationRegistry,
    now: &DateTime<Tz>,
) -> LocationResults
where
    Tz: TimeZone,
{
    let current_hour = now.hour();

    fetch_all(source, registry)
        .await
        .into_iter()
        .map(|(location, fetched)| {
            let id = location.id.clone();
            let result = fetched
                .and_then(|response| LocationSnapshot::build(location, &response, current_hour));
            if let Err(err) = &result {
                warn!("No snapshot for {}: {}", id, err);
            }
            (id, result)
        })
        .collect()
}

/// All-or-nothing refresh: a snapshot only when every location succeeded
pub async fn refresh<Tz>(
    source: &dyn ForecastSource,
    registry: &LocationRegistry,
    now: &DateTime<Tz>,
) -> Result<ForecastSnapshot, ClimaError>
where
    Tz: TimeZone,
{
    let results = refresh_each(source, registry, now).await;
    let snapshot = assemble(results, now.with_timezone(&Utc), now.hour())?;

    info!(
        "Refreshed {} locations at hour {}",
        snapshot.locations.len(),
        snapshot.current_hour
    );
    Ok(snapshot)
}

fn assemble(
    results: LocationResults,
    generated_at: DateTime<Utc>,
    current_hour: u32,
) -> Result<ForecastSnapshot, ClimaError> {
    let failed: Vec<String> = results
        .iter()
        .filter(|(_, r)| r.is_err())
        .map(|(id, _)| id.clone())
        .collect();

    if !failed.is_empty() {
        return Err(ClimaError::Refresh { failed });
    }

    let locations = results
        .into_iter()
        .filter_map(|(id, r)| r.ok().map(|snapshot| (id, snapshot)))
        .collect();

    Ok(ForecastSnapshot {
        generated_at,
        current_hour,
        locations,
    })
}

/// What the presentation layer should show
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum ViewState {
    /// No refresh has completed yet
    #[default]
    Loading,
    /// Latest good snapshot; `last_error` is set when a later refresh failed
    Ready {
        snapshot: ForecastSnapshot,
        last_error: Option<String>,
    },
    /// Nothing to show and no retry pending
    Unavailable { reason: String },
}

impl ViewState {
    /// Fold a refresh outcome into the state
    #[must_use]
    pub fn apply(self, result: Result<ForecastSnapshot, ClimaError>) -> Self {
        match (self, result) {
            (_, Ok(snapshot)) => Self::Ready {
                snapshot,
                last_error: None,
            },
            (Self::Ready { snapshot, .. }, Err(err)) => Self::Ready {
                snapshot,
                last_error: Some(err.to_string()),
            },
            (Self::Loading | Self::Unavailable { .. }, Err(err)) => Self::Unavailable {
                reason: err.user_message(),
            },
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<&ForecastSnapshot> {
        match self {
            Self::Ready { snapshot, .. } => Some(snapshot),
            Self::Loading | Self::Unavailable { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::AlertKind;
    use crate::weather::open_meteo::{CurrentWeather, HourlyData};
    use async_trait::async_trait;
    use chrono_tz::America::Sao_Paulo;

    struct FixedSource {
        failing: Vec<&'static str>,
    }

    fn response(winds: &[f64], rains: &[f64]) -> ForecastResponse {
        let n = winds.len();
        ForecastResponse {
            timezone: Some("America/Sao_Paulo".to_string()),
            current_weather: CurrentWeather {
                temperature: 26.2,
                wind_speed: 18.0,
                weather_code: 1,
            },
            hourly: HourlyData {
                time: (0..n).map(|i| format!("2024-03-01T{:02}:00", 12 + i)).collect(),
                temperature: vec![26.0; n],
                humidity: vec![65.0; n],
                precipitation_probability: rains.to_vec(),
                wind_speed: winds.to_vec(),
                weather_code: vec![1; n],
            },
        }
    }

    #[async_trait]
    impl ForecastSource for FixedSource {
        async fn fetch(&self, location: &Location) -> Result<ForecastResponse, ClimaError> {
            if self.failing.contains(&location.id.as_str()) {
                return Err(ClimaError::malformed("missing hourly block"));
            }
            Ok(response(&[10.0, 12.0, 30.0, 8.0], &[0.0, 20.0, 10.0, 5.0]))
        }
    }

    fn two_pm() -> DateTime<chrono_tz::Tz> {
        Sao_Paulo.with_ymd_and_hms(2024, 3, 1, 14, 5, 0).unwrap()
    }

    #[test]
    fn test_location_snapshot_at_two_pm() {
        let location = Location::new("itajai", "Itajaí", "", "Itajaí", -26.9, -48.66);
        let snapshot = LocationSnapshot::build(
            location,
            &response(&[10.0, 12.0, 30.0, 8.0], &[0.0, 20.0, 10.0, 5.0]),
            14,
        )
        .unwrap();

        // 12h and 13h are in the past
        assert_eq!(snapshot.hourly.len(), 2);
        assert_eq!(snapshot.current.rain_probability, 10);
        let kinds: Vec<AlertKind> = snapshot.alerts.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![AlertKind::Wind, AlertKind::Uv]);
    }

    #[tokio::test]
    async fn test_refresh_builds_every_location() {
        let source = FixedSource { failing: vec![] };
        let registry = LocationRegistry::default();

        let snapshot = refresh(&source, &registry, &two_pm()).await.unwrap();

        assert_eq!(snapshot.current_hour, 14);
        assert_eq!(snapshot.locations.len(), 2);
        assert_eq!(snapshot.get("bc").unwrap().location.display_name, "Rua Bibiano Santos");
        assert_eq!(snapshot.generated_at, two_pm().with_timezone(&Utc));
    }

    #[tokio::test]
    async fn test_refresh_each_keeps_partial_results() {
        let source = FixedSource {
            failing: vec!["bc"],
        };
        let registry = LocationRegistry::default();

        let results = refresh_each(&source, &registry, &two_pm()).await;
        assert!(results["itajai"].is_ok());
        assert!(results["bc"].as_ref().unwrap_err().is_malformed());

        let err = refresh(&source, &registry, &two_pm()).await.unwrap_err();
        assert_eq!(
            err,
            ClimaError::Refresh {
                failed: vec!["bc".to_string()]
            }
        );
    }

    fn ready_snapshot() -> ForecastSnapshot {
        ForecastSnapshot {
            generated_at: two_pm().with_timezone(&Utc),
            current_hour: 14,
            locations: BTreeMap::new(),
        }
    }

    #[test]
    fn test_view_state_failure_before_success_is_unavailable() {
        let state = ViewState::default().apply(Err(ClimaError::network("timeout")));
        assert!(matches!(state, ViewState::Unavailable { .. }));
        assert!(state.snapshot().is_none());

        let state = state.apply(Ok(ready_snapshot()));
        assert!(state.snapshot().is_some());
    }

    #[test]
    fn test_view_state_failure_keeps_previous_snapshot() {
        let state = ViewState::Loading.apply(Ok(ready_snapshot()));
        let state = state.apply(Err(ClimaError::network("timeout")));

        match &state {
            ViewState::Ready {
                snapshot,
                last_error,
            } => {
                assert_eq!(snapshot, &ready_snapshot());
                assert!(last_error.as_deref().unwrap().contains("timeout"));
            }
            other => panic!("expected ready state, got {other:?}"),
        }

        let state = state.apply(Ok(ready_snapshot()));
        assert!(matches!(
            state,
            ViewState::Ready {
                last_error: None,
                ..
            }
        ));
    }

    #[test]
    fn test_view_state_serializes_status_tag() {
        let json = serde_json::to_value(ViewState::Loading).unwrap();
        assert_eq!(json["status"], "loading");

        let json = serde_json::to_value(ViewState::Unavailable {
            reason: "down".to_string(),
        })
        .unwrap();
        assert_eq!(json["status"], "unavailable");
        assert_eq!(json["reason"], "down");

        let json = serde_json::to_value(ViewState::Loading.apply(Ok(ready_snapshot()))).unwrap();
        assert_eq!(json["status"], "ready");
        assert!(json["lastError"].is_null());
        assert_eq!(json["snapshot"]["currentHour"], 14);
        assert!(json["snapshot"]["generatedAt"].is_string());
    }
}
