//! Testing utilities and mock implementations for E2E tests.
//!
//! This module provides mock implementations of the external collaborator
//! traits, allowing lifecycle testing without real infrastructure.
//!
//! # Example
//!
//! ```rust,ignore
//! use grabbit_core::testing::{fixtures, MockDownloader, MockSearcher};
//!
//! let searcher = MockSearcher::new();
//! searcher.set_results(vec![
//!     fixtures::raw_result("Movie.2020.1080p.BluRay.x264-GRP", 1),
//! ]).await;
//!
//! let downloader = MockDownloader::torrent();
//! // Wire both into a Scheduler...
//! ```

mod mock_downloader;
mod mock_searcher;

pub use mock_downloader::{MockDownloader, RecordedHandOff};
pub use mock_searcher::MockSearcher;

use crate::scheduler::StorageMonitor;

/// Storage monitor reporting a fixed amount of free space.
pub struct FixedStorage {
    pub free_bytes: u64,
}

impl StorageMonitor for FixedStorage {
    fn free_bytes(&self) -> std::io::Result<u64> {
        Ok(self.free_bytes)
    }
}

/// Builders for common test data.
pub mod fixtures {
    use chrono::{TimeZone, Utc};

    use crate::quality::{QualityProfile, QualityTier};
    use crate::searcher::{Protocol, RawSearchResult};

    /// A torrent search result with sensible defaults.
    pub fn raw_result(title: &str, indexer_id: i64) -> RawSearchResult {
        RawSearchResult {
            title: title.to_string(),
            link: format!("https://indexer-{indexer_id}.example/dl/{}", title.len()),
            magnet_link: None,
            size_bytes: 4_000_000_000,
            seeders: Some(20),
            leechers: Some(2),
            publish_date: Some(Utc.with_ymd_and_hms(2026, 1, 15, 8, 0, 0).unwrap()),
            indexer_id,
            indexer_name: format!("indexer-{indexer_id}"),
            indexer_priority: 25,
            category: Some("Movies".to_string()),
            protocol: Protocol::Torrent,
        }
    }

    /// A profile accepting the whole 1080p band and up.
    pub fn hd_profile(name: &str) -> QualityProfile {
        QualityProfile {
            id: 0,
            name: name.to_string(),
            allowed_tiers: vec![
                QualityTier::Hdtv1080,
                QualityTier::Web1080,
                QualityTier::Bluray1080,
                QualityTier::Remux1080,
                QualityTier::Web2160,
                QualityTier::Bluray2160,
                QualityTier::Remux2160,
            ],
            upgrade_allowed: true,
            upgrade_until_score: 10,
            min_format_score: 0,
            cutoff_format_score: 0,
            format_scores: Default::default(),
        }
    }
}
