//! HTTP surface: routes, shared state and handlers.

use crate::{
    config::Config,
    dataset::Dataset,
    error::AppResult,
    model::ModelRegistry,
    snapshot::build_snapshot,
    stream::event_stream,
    types::PredictionResult,
};
use axum::{
    extract::State,
    response::sse::{Event, Sse},
    routing::get,
    Json, Router,
};
use futures::{Stream, StreamExt};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Everything a request needs, built once in `main`. Read-only.
#[derive(Clone)]
pub struct AppState {
    pub dataset: Arc<Dataset>,
    pub models: Arc<ModelRegistry>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(dataset: Dataset, models: ModelRegistry, config: Config) -> Self {
        Self {
            dataset: Arc::new(dataset),
            models: Arc::new(models),
            config: Arc::new(config),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/vehicle", get(vehicle_snapshot))
        .route("/api/vehicle-stream", get(vehicle_stream))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "dataset_rows": state.dataset.len(),
        "sample_size": state.config.sample_size,
    }))
}

async fn vehicle_snapshot(State(state): State<AppState>) -> AppResult<Json<Vec<PredictionResult>>> {
    let points = build_snapshot(
        &state.dataset,
        &state.models,
        state.config.sample_size,
        &mut rand::thread_rng(),
    )?;

    tracing::info!("sent {} points to frontend", points.len());
    Ok(Json(points))
}

async fn vehicle_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    tracing::info!(
        "stream client connected; {} rows every {:?}",
        state.dataset.len(),
        state.config.stream_interval
    );
    let events = event_stream(Arc::clone(&state.dataset), state.config.stream_interval)
        .map(|ev| Event::default().json_data(ev));
    Sse::new(events)
}
