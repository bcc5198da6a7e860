//! Types for the release search system.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Transfer protocol a release is delivered over.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    Torrent,
    Usenet,
}

/// What kind of media a search is for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Movie,
    Tv,
}

/// Query parameters for an indexer search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free-text search query.
    pub query: String,
    /// Optional: media kind hint for category mapping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<MediaKind>,
    /// Optional: TMDB id of the wanted item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmdb_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
    /// Optional: limit to specific indexer categories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<u32>>,
    /// Maximum results to return.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl SearchRequest {
    pub fn text(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            kind: None,
            tmdb_id: None,
            season: None,
            episode: None,
            categories: None,
            limit: None,
        }
    }
}

/// A single raw release as advertised by an indexer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSearchResult {
    /// Release title as published.
    pub title: String,
    /// Download link (.torrent or .nzb URL).
    pub link: String,
    /// Magnet URI, when the indexer provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnet_link: Option<String>,
    /// Size in bytes.
    pub size_bytes: u64,
    #[serde(default)]
    pub seeders: Option<u32>,
    #[serde(default)]
    pub leechers: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<DateTime<Utc>>,
    /// Which indexer returned this result.
    pub indexer_id: i64,
    pub indexer_name: String,
    /// Configured indexer priority; lower numbers win ties.
    pub indexer_priority: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub protocol: Protocol,
}

/// Errors that can occur during search operations.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search backend connection failed: {0}")]
    ConnectionFailed(String),

    #[error("search backend API error: {0}")]
    ApiError(String),

    #[error("request timeout")]
    Timeout,

    #[error("internal error: {0}")]
    Internal(String),
}

/// Trait for release search backends (Prowlarr, Torznab aggregators, ...).
///
/// Timeouts on individual calls are the backend's responsibility; callers
/// treat any error as "skip this item this cycle".
#[async_trait]
pub trait Searcher: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Execute a search and return the raw results.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawSearchResult>, SearchError>;
}
