//! Persistent entity types for the decision engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::searcher::MediaKind;

/// A library item the scheduler keeps searching for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonitoredItem {
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    pub media_kind: MediaKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmdb_id: Option<i64>,
    pub library_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_profile_id: Option<i64>,
    pub monitored: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_searched_at: Option<DateTime<Utc>>,
    /// Score of the copy already on disk; unset when nothing is owned yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owned_score: Option<i32>,
}

/// Request to add a monitored item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    pub media_kind: MediaKind,
    #[serde(default)]
    pub tmdb_id: Option<i64>,
    pub library_id: i64,
    #[serde(default)]
    pub quality_profile_id: Option<i64>,
    #[serde(default = "default_monitored")]
    pub monitored: bool,
}

fn default_monitored() -> bool {
    true
}

/// A release title that must never be grabbed again.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BlocklistEntry {
    pub id: i64,
    pub release_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub added_at: DateTime<Utc>,
}

/// An indexer barred from serving a specific library.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IndexerExclusion {
    pub id: i64,
    pub library_id: i64,
    pub indexer_id: i64,
}

/// A title excluded from automatic searching by TMDB id and kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaExclusion {
    pub id: i64,
    pub tmdb_id: i64,
    pub media_kind: MediaKind,
}

/// A deferred grab decision, consumed once `available_at` has passed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PendingGrab {
    pub id: String,
    pub media_id: i64,
    pub release_title: String,
    /// Serialized release reference (candidate JSON) for the later hand-off.
    pub release_json: String,
    pub score: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexer_id: Option<i64>,
    pub available_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Global behavior flags consulted by the scheduler and search paths.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Run the periodic monitored-item search sweep.
    #[serde(default = "default_true")]
    pub auto_search: bool,
    /// Hand winners to the download client automatically; when off the
    /// decision paths only report what would be grabbed.
    #[serde(default = "default_true")]
    pub auto_grab: bool,
    /// Global score floor applied before ranking.
    #[serde(default)]
    pub min_score: i32,
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_search: true,
            auto_grab: true,
            min_score: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::default();
        assert!(settings.auto_search);
        assert!(settings.auto_grab);
        assert_eq!(settings.min_score, 0);

        let parsed: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn test_create_item_request_defaults() {
        let json = r#"{"title": "Movie", "mediaKind": "movie", "libraryId": 1}"#;
        let request: CreateItemRequest = serde_json::from_str(json).unwrap();
        assert!(request.monitored);
        assert!(request.year.is_none());
    }

    #[test]
    fn test_pending_grab_round_trip() {
        let grab = PendingGrab {
            id: "g-1".to_string(),
            media_id: 7,
            release_title: "Movie.2020.1080p".to_string(),
            release_json: "{}".to_string(),
            score: 80,
            indexer_id: Some(2),
            available_at: Utc::now(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&grab).unwrap();
        let parsed: PendingGrab = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, grab);
    }
}
