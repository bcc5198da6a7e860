//! Blocklist, exclusion and pending-grab API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use grabbit_core::{
    BlocklistEntry, IndexerExclusion, MediaExclusion, MediaKind, PendingGrab,
};

use super::{error, store_error, ApiError};
use crate::state::AppState;

// ============================================================================
// Blocklist
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddBlocklistBody {
    pub release_title: String,
    #[serde(default)]
    pub media_id: Option<i64>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// GET /api/v1/blocklist
pub async fn list_blocklist(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BlocklistEntry>>, ApiError> {
    state.store().list_blocklist().map(Json).map_err(store_error)
}

/// POST /api/v1/blocklist
pub async fn add_blocklist(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AddBlocklistBody>,
) -> Result<(StatusCode, Json<BlocklistEntry>), ApiError> {
    let entry = state
        .store()
        .add_blocklist(&body.release_title, body.media_id, body.reason.as_deref())
        .map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// DELETE /api/v1/blocklist/{id}
pub async fn remove_blocklist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.store().remove_blocklist(id).map_err(store_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(error(StatusCode::NOT_FOUND, format!("entry {id} not found")))
    }
}

// ============================================================================
// Indexer exclusions
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddIndexerExclusionBody {
    pub library_id: i64,
    pub indexer_id: i64,
}

/// GET /api/v1/exclusions/indexer
pub async fn list_indexer_exclusions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<IndexerExclusion>>, ApiError> {
    state
        .store()
        .list_indexer_exclusions()
        .map(Json)
        .map_err(store_error)
}

/// POST /api/v1/exclusions/indexer
pub async fn add_indexer_exclusion(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AddIndexerExclusionBody>,
) -> Result<(StatusCode, Json<IndexerExclusion>), ApiError> {
    let exclusion = state
        .store()
        .add_indexer_exclusion(body.library_id, body.indexer_id)
        .map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(exclusion)))
}

/// DELETE /api/v1/exclusions/indexer/{id}
pub async fn remove_indexer_exclusion(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state
        .store()
        .remove_indexer_exclusion(id)
        .map_err(store_error)?
    {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(error(
            StatusCode::NOT_FOUND,
            format!("exclusion {id} not found"),
        ))
    }
}

// ============================================================================
// Media exclusions
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMediaExclusionBody {
    pub tmdb_id: i64,
    pub media_kind: MediaKind,
}

/// GET /api/v1/exclusions/media
pub async fn list_media_exclusions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MediaExclusion>>, ApiError> {
    state
        .store()
        .list_media_exclusions()
        .map(Json)
        .map_err(store_error)
}

/// POST /api/v1/exclusions/media
pub async fn add_media_exclusion(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AddMediaExclusionBody>,
) -> Result<(StatusCode, Json<MediaExclusion>), ApiError> {
    let exclusion = state
        .store()
        .add_media_exclusion(body.tmdb_id, body.media_kind)
        .map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(exclusion)))
}

/// DELETE /api/v1/exclusions/media/{id}
pub async fn remove_media_exclusion(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state
        .store()
        .remove_media_exclusion(id)
        .map_err(store_error)?
    {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(error(
            StatusCode::NOT_FOUND,
            format!("exclusion {id} not found"),
        ))
    }
}

// ============================================================================
// Pending grabs
// ============================================================================

/// GET /api/v1/pending
pub async fn list_pending(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PendingGrab>>, ApiError> {
    state.store().list_pending().map(Json).map_err(store_error)
}

/// DELETE /api/v1/pending/{id}
pub async fn cancel_pending(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.store().remove_pending(&id).map_err(store_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(error(
            StatusCode::NOT_FOUND,
            format!("pending grab {id} not found"),
        ))
    }
}
