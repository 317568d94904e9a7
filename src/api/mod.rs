use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, instrument};

use crate::{
    chart::{self, ChartGeometry},
    location::{Location, LocationRegistry},
    snapshot::{self, LocationSnapshot, ViewState},
    weather::{ChartMetric, ForecastSource, chart_series},
};

const DEFAULT_CHART_HEIGHT: f64 = 100.0;
const MAX_CHART_HEIGHT: f64 = 1000.0;

/// Shared handler state. The view is swapped wholesale on every refresh.
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn ForecastSource>,
    pub registry: Arc<LocationRegistry>,
    pub timezone: chrono_tz::Tz,
    pub view: Arc<RwLock<ViewState>>,
    /// Held for a whole refresh so results are applied in start order
    refresh_gate: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(
        source: Arc<dyn ForecastSource>,
        registry: LocationRegistry,
        timezone: chrono_tz::Tz,
    ) -> Self {
        Self {
            source,
            registry: Arc::new(registry),
            timezone,
            view: Arc::new(RwLock::new(ViewState::Loading)),
            refresh_gate: Arc::new(Mutex::new(())),
        }
    }

    /// Run one refresh and fold it into the view. Overlapping calls queue.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> ViewState {
        let _gate = self.refresh_gate.lock().await;
        let now = Utc::now().with_timezone(&self.timezone);
        let result = snapshot::refresh(self.source.as_ref(), &self.registry, &now).await;

        let mut view = self.view.write().await;
        *view = std::mem::take(&mut *view).apply(result);
        view.clone()
    }
}

#[derive(Deserialize)]
pub struct ChartQuery {
    pub metric: Option<ChartMetric>,
    pub height: Option<f64>,
}

#[derive(Serialize, Deserialize)]
pub struct ChartResponse {
    pub metric: ChartMetric,
    pub unit: String,
    /// `None` when the location has no remaining hours today
    pub geometry: Option<ChartGeometry>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/locations", get(get_locations))
        .route("/locations/{id}", get(get_location))
        .route("/locations/{id}/chart", get(get_chart))
        .route("/snapshot", get(get_snapshot))
        .route("/refresh", post(post_refresh))
        .with_state(state)
}

async fn get_locations(State(state): State<AppState>) -> Json<Vec<Location>> {
    Json(state.registry.iter().cloned().collect())
}

async fn get_snapshot(State(state): State<AppState>) -> Json<ViewState> {
    Json(state.view.read().await.clone())
}

async fn post_refresh(State(state): State<AppState>) -> Json<ViewState> {
    Json(state.refresh().await)
}

async fn location_snapshot(state: &AppState, id: &str) -> Result<LocationSnapshot, StatusCode> {
    state.registry.require(id).map_err(|err| {
        debug!("{}", err);
        StatusCode::NOT_FOUND
    })?;

    let view = state.view.read().await;
    view.snapshot()
        .and_then(|snapshot| snapshot.get(id))
        .cloned()
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)
}

async fn get_location(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LocationSnapshot>, StatusCode> {
    location_snapshot(&state, &id).await.map(Json)
}

async fn get_chart(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<ChartResponse>, StatusCode> {
    let metric = query.metric.unwrap_or(ChartMetric::Temperature);
    let height = query.height.unwrap_or(DEFAULT_CHART_HEIGHT);
    if !(height.is_finite() && height > 0.0 && height <= MAX_CHART_HEIGHT) {
        return Err(StatusCode::BAD_REQUEST);
    }

    let location = location_snapshot(&state, &id).await?;
    let series = chart_series(&location.hourly, metric);

    Ok(Json(ChartResponse {
        metric,
        unit: metric.unit().to_string(),
        geometry: chart::scale(&series, metric.mode(), height),
    }))
}
