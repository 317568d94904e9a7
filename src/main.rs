use std::sync::Arc;

use anyhow::Result;
use clima::api::AppState;
use clima::config::LoggingConfig;
use clima::{ClimaConfig, LocationRegistry, OpenMeteoClient, ViewState, web};
use tracing_subscriber::EnvFilter;

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("clima={},tower_http=info", logging.level)));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.format == "compact" {
        builder.compact().init();
    } else {
        builder.pretty().init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = ClimaConfig::load()?;
    init_tracing(&config.logging);

    let timezone = config.weather.tz()?;
    let client = OpenMeteoClient::new(&config.weather)?;
    let registry = LocationRegistry::default();
    tracing::info!(
        "Serving forecasts for {} in {}",
        registry.ids().join(", "),
        timezone
    );
    let state = AppState::new(Arc::new(client), registry, timezone);

    match state.refresh().await {
        ViewState::Ready { snapshot, .. } => tracing::info!(
            "Initial snapshot ready for {} locations",
            snapshot.locations.len()
        ),
        ViewState::Unavailable { reason } => {
            tracing::error!("Initial refresh failed: {}", reason)
        }
        ViewState::Loading => {}
    }

    web::run(config.server.port, state).await
}
