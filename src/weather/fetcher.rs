//! Forecast retrieval
//!
//! One upstream request per location, all issued together and joined before
//! anything downstream runs. Failures stay attached to their location.

use super::open_meteo::{self, ForecastResponse};
use crate::ClimaError;
use crate::config::WeatherConfig;
use crate::location::{Location, LocationRegistry};
use async_trait::async_trait;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// Source of raw forecasts for a single location
#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn fetch(&self, location: &Location) -> Result<ForecastResponse, ClimaError>;
}

/// `OpenMeteo` HTTP client with explicit timeout and retry policy
pub struct OpenMeteoClient {
    client: ClientWithMiddleware,
    base_url: String,
    timezone: String,
}

impl OpenMeteoClient {
    pub fn new(config: &WeatherConfig) -> Result<Self, ClimaError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("clima/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClimaError::config(format!("Failed to create HTTP client: {e}")))?;

        let mut builder = ClientBuilder::new(http);
        if config.max_retries > 0 {
            let policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
            builder = builder.with(RetryTransientMiddleware::new_with_policy(policy));
        }

        Ok(Self {
            client: builder.build(),
            base_url: config.base_url.clone(),
            timezone: config.timezone.clone(),
        })
    }
}

#[async_trait]
impl ForecastSource for OpenMeteoClient {
    #[instrument(skip(self, location), fields(location = %location.id))]
    async fn fetch(&self, location: &Location) -> Result<ForecastResponse, ClimaError> {
        let url = open_meteo::forecast_url(&self.base_url, location, &self.timezone);
        debug!(
            "OpenMeteo API request for {} ({}): {}",
            location.id,
            location.format_coordinates(),
            url
        );

        let start_time = Instant::now();
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("Forecast request for {} returned {}", location.id, status);
            return Err(ClimaError::network(format!(
                "HTTP {status} from forecast service"
            )));
        }

        let body = response.text().await?;
        let forecast = ForecastResponse::from_json(&body)
            .and_then(|forecast| {
                forecast.ensure_timezone(&self.timezone)?;
                Ok(forecast)
            })
            .map_err(|e| {
                error!("Failed to parse forecast for {}: {}", location.id, e);
                e
            })?;

        info!(
            "Retrieved {} hourly entries for {} in {:.3}s",
            forecast.hourly.time.len(),
            location.id,
            start_time.elapsed().as_secs_f64()
        );

        Ok(forecast)
    }
}

/// Fetch every registry location concurrently, keeping registry order
pub async fn fetch_all(
    source: &dyn ForecastSource,
    registry: &LocationRegistry,
) -> Vec<(Location, Result<ForecastResponse, ClimaError>)> {
    futures::future::join_all(registry.iter().map(|location| async move {
        let result = source.fetch(location).await;
        if let Err(err) = &result {
            warn!("Forecast fetch failed for {}: {}", location.id, err);
        }
        (location.clone(), result)
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::open_meteo::{CurrentWeather, HourlyData};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct StubSource {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        order: Mutex<Vec<String>>,
    }

    fn empty_response() -> ForecastResponse {
        ForecastResponse {
            timezone: None,
            current_weather: CurrentWeather {
                temperature: 20.0,
                wind_speed: 5.0,
                weather_code: 0,
            },
            hourly: HourlyData {
                time: vec![],
                temperature: vec![],
                humidity: vec![],
                precipitation_probability: vec![],
                wind_speed: vec![],
                weather_code: vec![],
            },
        }
    }

    #[async_trait]
    impl ForecastSource for StubSource {
        async fn fetch(&self, location: &Location) -> Result<ForecastResponse, ClimaError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.order.lock().unwrap().push(location.id.clone());

            if location.id == "broken" {
                Err(ClimaError::network("connection refused"))
            } else {
                Ok(empty_response())
            }
        }
    }

    #[tokio::test]
    async fn test_fetch_all_runs_concurrently_and_keeps_failures_local() {
        let registry = LocationRegistry::new(vec![
            Location::new("a", "A", "", "A", 0.0, 0.0),
            Location::new("broken", "B", "", "B", 1.0, 1.0),
            Location::new("c", "C", "", "C", 2.0, 2.0),
        ]);
        let source = StubSource {
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            order: Mutex::new(Vec::new()),
        };

        let results = fetch_all(&source, &registry).await;

        let ids: Vec<&str> = results.iter().map(|(l, _)| l.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "broken", "c"]);
        assert!(results[0].1.is_ok());
        assert!(results[1].1.as_ref().unwrap_err().is_network());
        assert!(results[2].1.is_ok());
        assert_eq!(source.peak.load(Ordering::SeqCst), 3);
        assert_eq!(source.order.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_client_builds_with_and_without_retries() {
        let mut config = WeatherConfig::default();
        assert!(OpenMeteoClient::new(&config).is_ok());

        config.max_retries = 2;
        assert!(OpenMeteoClient::new(&config).is_ok());
    }
}
