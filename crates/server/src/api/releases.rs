//! Release parsing and interactive scored-search handlers.
//!
//! The scored-search response schema is a hard external contract: UIs bind
//! to the field names, so they must not drift.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use grabbit_core::{
    parse, score_release, Candidate, FormatHit, ParsedRelease, SearchRequest,
};

use super::{error, store_error, ApiError};
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredSearchRequest {
    pub query: String,
    /// Profile to score against; omitted = base scores only, no rejections.
    #[serde(default)]
    pub profile_id: Option<i64>,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// One scored search result. Field names and types are bound by external
/// clients; see the API documentation before changing anything here.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredReleaseResponse {
    pub title: String,
    pub indexer_id: i64,
    pub indexer_name: String,
    pub size: u64,
    pub seeders: Option<u32>,
    pub leechers: Option<u32>,
    pub publish_date: Option<DateTime<Utc>>,
    pub category: Option<String>,
    pub quality: String,
    pub resolution: String,
    pub source: String,
    pub codec: Option<String>,
    pub audio_codec: Option<String>,
    pub audio_feature: Option<String>,
    pub hdr: Vec<String>,
    pub release_group: Option<String>,
    pub proper: bool,
    pub repack: bool,
    pub base_score: i32,
    pub custom_format_hits: Vec<FormatHit>,
    pub total_score: i32,
    pub rejected: bool,
    pub rejection_reason: Option<String>,
}

impl From<Candidate> for ScoredReleaseResponse {
    fn from(candidate: Candidate) -> Self {
        let Candidate { raw, scored } = candidate;
        let parsed = scored.parsed;
        Self {
            title: raw.title,
            indexer_id: raw.indexer_id,
            indexer_name: raw.indexer_name,
            size: raw.size_bytes,
            seeders: raw.seeders,
            leechers: raw.leechers,
            publish_date: raw.publish_date,
            category: raw.category,
            quality: scored.tier.label().to_string(),
            resolution: parsed
                .resolution
                .map(|r| r.label().to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            source: parsed
                .source
                .map(|s| s.label().to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            codec: parsed.codec.map(|c| c.label().to_string()),
            audio_codec: parsed.audio_codec,
            audio_feature: parsed.audio_channels,
            hdr: parsed
                .hdr_formats
                .iter()
                .map(|h| h.label().to_string())
                .collect(),
            release_group: parsed.release_group,
            proper: parsed.proper,
            repack: parsed.repack,
            base_score: scored.base_score,
            custom_format_hits: scored.format_hits,
            total_score: scored.total_score,
            rejected: scored.rejected,
            rejection_reason: scored.rejection_reason,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/parse
///
/// Parse a release title into structured attributes.
pub async fn parse_title(Json(body): Json<ParseRequest>) -> Json<ParsedRelease> {
    Json(parse(&body.title))
}

/// POST /api/v1/search/scored
///
/// Run a provider search, then parse and score every result. The whole
/// scored list is returned even when every candidate is rejected.
pub async fn search_scored(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ScoredSearchRequest>,
) -> Result<Json<Vec<ScoredReleaseResponse>>, ApiError> {
    let Some(searcher) = state.searcher() else {
        return Err(error(
            StatusCode::SERVICE_UNAVAILABLE,
            "no search provider configured",
        ));
    };

    let profile = match body.profile_id {
        Some(id) => Some(
            state
                .store()
                .get_profile(id)
                .map_err(store_error)?
                .ok_or_else(|| error(StatusCode::NOT_FOUND, format!("profile {id} not found")))?,
        ),
        None => None,
    };
    let formats = state.store().list_formats().map_err(store_error)?;

    let request = SearchRequest {
        limit: body.limit,
        ..SearchRequest::text(body.query)
    };
    let results = searcher
        .search(&request)
        .await
        .map_err(|e| error(StatusCode::BAD_GATEWAY, e.to_string()))?;

    let scored = results
        .into_iter()
        .map(|raw| {
            let parsed = parse(&raw.title);
            let scored = score_release(&parsed, profile.as_ref(), &formats, None);
            ScoredReleaseResponse::from(Candidate { raw, scored })
        })
        .collect();

    Ok(Json(scored))
}

#[cfg(test)]
mod tests {
    use super::*;
    use grabbit_core::testing::fixtures;

    #[test]
    fn test_wire_schema_field_names() {
        let raw = fixtures::raw_result("Movie.2020.1080p.BluRay.x264-GRP", 1);
        let parsed = parse(&raw.title);
        let scored = score_release(&parsed, None, &[], None);
        let response = ScoredReleaseResponse::from(Candidate { raw, scored });

        let json = serde_json::to_value(&response).unwrap();
        for field in [
            "title",
            "indexerId",
            "indexerName",
            "size",
            "seeders",
            "leechers",
            "publishDate",
            "category",
            "quality",
            "resolution",
            "source",
            "codec",
            "audioCodec",
            "audioFeature",
            "hdr",
            "releaseGroup",
            "proper",
            "repack",
            "baseScore",
            "customFormatHits",
            "totalScore",
            "rejected",
            "rejectionReason",
        ] {
            assert!(json.get(field).is_some(), "missing wire field {field}");
        }
        assert_eq!(json["quality"], "BluRay-1080p");
        assert_eq!(json["resolution"], "1080p");
        assert_eq!(json["releaseGroup"], "GRP");
        assert_eq!(json["rejected"], false);
    }

    #[test]
    fn test_unknown_resolution_and_source_serialize_as_unknown() {
        let raw = fixtures::raw_result("Completely Opaque Name", 1);
        let parsed = parse(&raw.title);
        let scored = score_release(&parsed, None, &[], None);
        let response = ScoredReleaseResponse::from(Candidate { raw, scored });
        assert_eq!(response.resolution, "Unknown");
        assert_eq!(response.source, "Unknown");
        assert_eq!(response.quality, "Unknown");
        assert!(response.codec.is_none());
    }
}
