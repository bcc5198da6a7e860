//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Indexer searches (counts, duration)
//! - Scoring (releases scored/rejected)
//! - Decisions (outcome per decision pass)
//! - Grab hand-offs and pending-grab promotions

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Search Metrics
// =============================================================================

/// Indexer search requests by result.
pub static SEARCH_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("grabbit_search_requests_total", "Indexer search requests"),
        &["result"], // "ok", "error"
    )
    .unwrap()
});

/// Search duration in seconds.
pub static SEARCH_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "grabbit_search_duration_seconds",
            "Duration of indexer searches",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &[],
    )
    .unwrap()
});

// =============================================================================
// Scoring Metrics
// =============================================================================

/// Releases run through the scoring engine.
pub static RELEASES_SCORED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("grabbit_releases_scored_total", "Releases scored").unwrap()
});

/// Releases rejected by scoring, by reason.
pub static RELEASES_REJECTED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "grabbit_releases_rejected_total",
            "Releases rejected during scoring",
        ),
        &["reason"],
    )
    .unwrap()
});

// =============================================================================
// Decision Metrics
// =============================================================================

/// Decision passes by outcome.
pub static DECISIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("grabbit_decisions_total", "Decision passes by outcome"),
        &["outcome"], // "grabbed", "grab_failed", "reported", "deferred", "none"
    )
    .unwrap()
});

/// Grab hand-offs to download clients by result.
pub static GRAB_HANDOFFS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "grabbit_grab_handoffs_total",
            "Hand-offs to download clients",
        ),
        &["result"], // "ok", "error"
    )
    .unwrap()
});

/// Pending grabs promoted to a hand-off by result.
pub static PENDING_PROMOTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "grabbit_pending_promotions_total",
            "Pending grabs promoted after their delay",
        ),
        &["result"], // "ok", "error", "dropped"
    )
    .unwrap()
});

/// All core collectors for registration by the server.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(SEARCH_REQUESTS.clone()),
        Box::new(SEARCH_DURATION.clone()),
        Box::new(RELEASES_SCORED.clone()),
        Box::new(RELEASES_REJECTED.clone()),
        Box::new(DECISIONS.clone()),
        Box::new(GRAB_HANDOFFS.clone()),
        Box::new(PENDING_PROMOTIONS.clone()),
    ]
}
