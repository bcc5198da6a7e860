//! Quality profile, custom format, delay profile and release filter CRUD.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use grabbit_core::{CustomFormatDef, DelayProfile, QualityProfile, ReleaseFilter};

use super::{error, store_error, ApiError};
use crate::state::AppState;

// ============================================================================
// Quality profiles
// ============================================================================

/// GET /api/v1/profiles
pub async fn list_profiles(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<QualityProfile>>, ApiError> {
    state.store().list_profiles().map(Json).map_err(store_error)
}

/// POST /api/v1/profiles
///
/// Create (id omitted or 0) or replace (id set) a profile.
pub async fn save_profile(
    State(state): State<Arc<AppState>>,
    Json(mut body): Json<QualityProfile>,
) -> Result<Json<QualityProfile>, ApiError> {
    body.id = state.store().save_profile(&body).map_err(store_error)?;
    Ok(Json(body))
}

/// DELETE /api/v1/profiles/{id}
pub async fn delete_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.store().delete_profile(id).map_err(store_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(error(StatusCode::NOT_FOUND, format!("profile {id} not found")))
    }
}

// ============================================================================
// Custom formats
// ============================================================================

/// GET /api/v1/formats
pub async fn list_formats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CustomFormatDef>>, ApiError> {
    state.store().list_formats().map(Json).map_err(store_error)
}

/// POST /api/v1/formats
pub async fn save_format(
    State(state): State<Arc<AppState>>,
    Json(mut body): Json<CustomFormatDef>,
) -> Result<Json<CustomFormatDef>, ApiError> {
    body.id = state.store().save_format(&body).map_err(store_error)?;
    Ok(Json(body))
}

/// DELETE /api/v1/formats/{id}
pub async fn delete_format(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.store().delete_format(id).map_err(store_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(error(StatusCode::NOT_FOUND, format!("format {id} not found")))
    }
}

// ============================================================================
// Delay profiles
// ============================================================================

/// GET /api/v1/delay-profiles
pub async fn list_delay_profiles(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DelayProfile>>, ApiError> {
    state
        .store()
        .list_delay_profiles()
        .map(Json)
        .map_err(store_error)
}

/// POST /api/v1/delay-profiles
pub async fn save_delay_profile(
    State(state): State<Arc<AppState>>,
    Json(mut body): Json<DelayProfile>,
) -> Result<Json<DelayProfile>, ApiError> {
    body.id = state
        .store()
        .save_delay_profile(&body)
        .map_err(store_error)?;
    Ok(Json(body))
}

/// DELETE /api/v1/delay-profiles/{id}
pub async fn delete_delay_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.store().delete_delay_profile(id).map_err(store_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(error(
            StatusCode::NOT_FOUND,
            format!("delay profile {id} not found"),
        ))
    }
}

// ============================================================================
// Release filters
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFiltersParams {
    pub profile_id: i64,
}

/// GET /api/v1/filters?profileId={id}
pub async fn list_filters(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListFiltersParams>,
) -> Result<Json<Vec<ReleaseFilter>>, ApiError> {
    state
        .store()
        .list_filters(params.profile_id)
        .map(Json)
        .map_err(store_error)
}

/// POST /api/v1/filters
pub async fn save_filter(
    State(state): State<Arc<AppState>>,
    Json(mut body): Json<ReleaseFilter>,
) -> Result<Json<ReleaseFilter>, ApiError> {
    body.id = state.store().save_filter(&body).map_err(store_error)?;
    Ok(Json(body))
}

/// DELETE /api/v1/filters/{id}
pub async fn delete_filter(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.store().delete_filter(id).map_err(store_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(error(StatusCode::NOT_FOUND, format!("filter {id} not found")))
    }
}
