//! Scheduler configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the decision scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Enable/disable the background loops. Interactive decision paths work
    /// either way.
    #[serde(default)]
    pub enabled: bool,

    /// How often the monitored-item search sweep wakes up (seconds).
    #[serde(default = "default_search_tick")]
    pub search_tick_secs: u64,

    /// How often the RSS sync runs (seconds).
    #[serde(default = "default_rss_tick")]
    pub rss_tick_secs: u64,

    /// How often due pending grabs are promoted (seconds).
    #[serde(default = "default_pending_tick")]
    pub pending_tick_secs: u64,

    /// Minimum time between two searches for the same item (minutes).
    #[serde(default = "default_search_interval")]
    pub search_interval_minutes: u64,

    /// Pause between successive indexer calls within one sweep
    /// (milliseconds). Backpressure, not correctness.
    #[serde(default = "default_indexer_pause")]
    pub indexer_pause_ms: u64,

    /// Result limit passed to the search provider.
    #[serde(default = "default_search_limit")]
    pub search_limit: u32,

    /// Skip all grabs when free disk space falls below this (bytes).
    /// 0 disables the guard.
    #[serde(default)]
    pub min_free_disk_bytes: u64,
}

fn default_search_tick() -> u64 {
    900 // 15 minutes
}

fn default_rss_tick() -> u64 {
    1800 // 30 minutes
}

fn default_pending_tick() -> u64 {
    60
}

fn default_search_interval() -> u64 {
    720 // 12 hours
}

fn default_indexer_pause() -> u64 {
    1000
}

fn default_search_limit() -> u32 {
    100
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            search_tick_secs: default_search_tick(),
            rss_tick_secs: default_rss_tick(),
            pending_tick_secs: default_pending_tick(),
            search_interval_minutes: default_search_interval(),
            indexer_pause_ms: default_indexer_pause(),
            search_limit: default_search_limit(),
            min_free_disk_bytes: 0,
        }
    }
}
