use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use grabbit_core::{SanitizedConfig, SchedulerStatus};

use crate::metrics;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

pub async fn scheduler_status(State(state): State<Arc<AppState>>) -> Json<SchedulerStatus> {
    Json(state.scheduler().status())
}

/// GET /metrics - Prometheus text exposition format.
pub async fn get_metrics() -> String {
    metrics::render()
}
