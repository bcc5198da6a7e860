//! Persistence trait for the decision engine.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::quality::{CustomFormatDef, DelayProfile, QualityProfile, ReleaseFilter};
use crate::searcher::MediaKind;

use super::types::{
    BlocklistEntry, CreateItemRequest, IndexerExclusion, MediaExclusion, MonitoredItem,
    PendingGrab, Settings,
};

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Read-side predicates the candidate ranker consults while gating.
/// Owned by the persistence layer so the ranker never sees storage details.
pub trait GateChecks: Send + Sync {
    /// Whether an equivalent release title is already blocklisted.
    fn is_blocklisted(&self, release_title: &str) -> Result<bool, StoreError>;

    /// Whether this indexer is excluded for the target library.
    fn is_indexer_excluded(&self, library_id: i64, indexer_id: i64) -> Result<bool, StoreError>;
}

/// CRUD surface over everything the decision engine persists.
pub trait DecisionStore: GateChecks {
    // Monitored items
    fn list_items(&self) -> Result<Vec<MonitoredItem>, StoreError>;
    fn get_item(&self, id: i64) -> Result<Option<MonitoredItem>, StoreError>;
    fn create_item(&self, request: &CreateItemRequest) -> Result<MonitoredItem, StoreError>;
    fn delete_item(&self, id: i64) -> Result<bool, StoreError>;
    fn set_last_searched(&self, id: i64, at: DateTime<Utc>) -> Result<(), StoreError>;
    fn set_owned_score(&self, id: i64, score: Option<i32>) -> Result<(), StoreError>;

    // Quality profiles
    fn list_profiles(&self) -> Result<Vec<QualityProfile>, StoreError>;
    fn get_profile(&self, id: i64) -> Result<Option<QualityProfile>, StoreError>;
    fn save_profile(&self, profile: &QualityProfile) -> Result<i64, StoreError>;
    fn delete_profile(&self, id: i64) -> Result<bool, StoreError>;

    // Custom formats
    fn list_formats(&self) -> Result<Vec<CustomFormatDef>, StoreError>;
    fn save_format(&self, format: &CustomFormatDef) -> Result<i64, StoreError>;
    fn delete_format(&self, id: i64) -> Result<bool, StoreError>;

    // Delay profiles
    fn list_delay_profiles(&self) -> Result<Vec<DelayProfile>, StoreError>;
    fn save_delay_profile(&self, profile: &DelayProfile) -> Result<i64, StoreError>;
    fn delete_delay_profile(&self, id: i64) -> Result<bool, StoreError>;

    // Release filters, in definition order per profile
    fn list_filters(&self, profile_id: i64) -> Result<Vec<ReleaseFilter>, StoreError>;
    fn save_filter(&self, filter: &ReleaseFilter) -> Result<i64, StoreError>;
    fn delete_filter(&self, id: i64) -> Result<bool, StoreError>;

    // Blocklist
    fn list_blocklist(&self) -> Result<Vec<BlocklistEntry>, StoreError>;
    fn add_blocklist(
        &self,
        release_title: &str,
        media_id: Option<i64>,
        reason: Option<&str>,
    ) -> Result<BlocklistEntry, StoreError>;
    fn remove_blocklist(&self, id: i64) -> Result<bool, StoreError>;

    // Per-library indexer exclusions
    fn list_indexer_exclusions(&self) -> Result<Vec<IndexerExclusion>, StoreError>;
    fn add_indexer_exclusion(
        &self,
        library_id: i64,
        indexer_id: i64,
    ) -> Result<IndexerExclusion, StoreError>;
    fn remove_indexer_exclusion(&self, id: i64) -> Result<bool, StoreError>;

    // TMDB media exclusions
    fn list_media_exclusions(&self) -> Result<Vec<MediaExclusion>, StoreError>;
    fn add_media_exclusion(
        &self,
        tmdb_id: i64,
        media_kind: MediaKind,
    ) -> Result<MediaExclusion, StoreError>;
    fn remove_media_exclusion(&self, id: i64) -> Result<bool, StoreError>;
    fn is_media_excluded(&self, tmdb_id: i64, media_kind: MediaKind) -> Result<bool, StoreError>;

    // Pending grabs
    fn list_pending(&self) -> Result<Vec<PendingGrab>, StoreError>;
    fn due_pending(&self, now: DateTime<Utc>) -> Result<Vec<PendingGrab>, StoreError>;
    fn save_pending(&self, grab: &PendingGrab) -> Result<(), StoreError>;
    fn remove_pending(&self, id: &str) -> Result<bool, StoreError>;

    // Settings flags
    fn get_settings(&self) -> Result<Settings, StoreError>;
    fn save_settings(&self, settings: &Settings) -> Result<(), StoreError>;
}
