//! Monitored-item ("wanted") API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use grabbit_core::{CreateItemRequest, DecisionOutcome, DecisionReport, MonitoredItem};

use super::releases::ScoredReleaseResponse;
use super::{error, store_error, ApiError};
use crate::state::AppState;

// ============================================================================
// Response types
// ============================================================================

/// Outcome of an interactive decision pass. `results` carries every scored
/// candidate in the external wire schema, rejected ones included.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionResponse {
    pub outcome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub results: Vec<ScoredReleaseResponse>,
}

impl From<DecisionReport> for DecisionResponse {
    fn from(report: DecisionReport) -> Self {
        let results = report
            .candidates
            .into_iter()
            .map(ScoredReleaseResponse::from)
            .collect();
        let mut response = DecisionResponse::from(report.outcome);
        response.results = results;
        response
    }
}

impl From<DecisionOutcome> for DecisionResponse {
    fn from(outcome: DecisionOutcome) -> Self {
        let label = outcome.label().to_string();
        match outcome {
            DecisionOutcome::Grabbed(c) | DecisionOutcome::Reported(c) => Self {
                outcome: label,
                title: Some(c.raw.title),
                total_score: Some(c.scored.total_score),
                available_at: None,
                error: None,
                results: Vec::new(),
            },
            DecisionOutcome::GrabFailed { candidate, error } => Self {
                outcome: label,
                title: Some(candidate.raw.title),
                total_score: Some(candidate.scored.total_score),
                available_at: None,
                error: Some(error),
                results: Vec::new(),
            },
            DecisionOutcome::Deferred(grab) => Self {
                outcome: label,
                title: Some(grab.release_title),
                total_score: Some(grab.score),
                available_at: Some(grab.available_at),
                error: None,
                results: Vec::new(),
            },
            DecisionOutcome::NoneAcceptable => Self {
                outcome: label,
                title: None,
                total_score: None,
                available_at: None,
                error: None,
                results: Vec::new(),
            },
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/wanted
pub async fn list_items(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MonitoredItem>>, ApiError> {
    state.store().list_items().map(Json).map_err(store_error)
}

/// POST /api/v1/wanted
pub async fn create_item(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<MonitoredItem>), ApiError> {
    let item = state.store().create_item(&body).map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// DELETE /api/v1/wanted/{id}
pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.store().delete_item(id).map_err(store_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(error(StatusCode::NOT_FOUND, format!("item {id} not found")))
    }
}

/// POST /api/v1/wanted/{id}/search
///
/// Run one synchronous decision pass for the item. Honors the `auto_grab`
/// settings flag: with it off the winning candidate is only reported.
pub async fn search_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<DecisionResponse>, ApiError> {
    let item = state
        .store()
        .get_item(id)
        .map_err(store_error)?
        .ok_or_else(|| error(StatusCode::NOT_FOUND, format!("item {id} not found")))?;

    let settings = state.store().get_settings().map_err(store_error)?;
    let report = state
        .scheduler()
        .decide_for_item(&item, &settings)
        .await
        .map_err(|e| error(StatusCode::BAD_GATEWAY, e.to_string()))?;

    Ok(Json(DecisionResponse::from(report)))
}
