//! Types for the decision scheduler.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::download::DownloadError;
use crate::ranker::Candidate;
use crate::searcher::SearchError;
use crate::store::{PendingGrab, StoreError};

/// Named background tasks guarded against overlapping with themselves.
pub const TASK_SEARCH: &str = "search monitored";
pub const TASK_RSS: &str = "rss sync";
pub const TASK_PENDING: &str = "pending grabs";

/// Errors that can occur while driving decisions. All of them are per-item:
/// the loops log and move on, nothing halts the scheduler.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("search error: {0}")]
    Search(#[from] SearchError),

    #[error("download error: {0}")]
    Download(#[from] DownloadError),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Outcome of one decision pass over a monitored item.
#[derive(Debug, Clone)]
pub enum DecisionOutcome {
    /// A winner was handed to the download client.
    Grabbed(Candidate),
    /// A winner was found but the hand-off failed; the next cycle retries.
    GrabFailed { candidate: Candidate, error: String },
    /// Auto-grab is off: the winner is only reported.
    Reported(Candidate),
    /// A delay profile deferred the grab.
    Deferred(PendingGrab),
    /// Nothing survived scoring and gating.
    NoneAcceptable,
}

impl DecisionOutcome {
    /// Stable label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            DecisionOutcome::Grabbed(_) => "grabbed",
            DecisionOutcome::GrabFailed { .. } => "grab_failed",
            DecisionOutcome::Reported(_) => "reported",
            DecisionOutcome::Deferred(_) => "deferred",
            DecisionOutcome::NoneAcceptable => "none",
        }
    }
}

/// Outcome of a decision pass plus every candidate that was scored on the
/// way, rejected ones included. Interactive callers surface the whole list.
#[derive(Debug, Clone)]
pub struct DecisionReport {
    pub outcome: DecisionOutcome,
    pub candidates: Vec<Candidate>,
}

/// Current scheduler status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerStatus {
    pub running: bool,
    /// Names of background tasks currently in flight.
    pub active_tasks: Vec<String>,
    pub pending_grabs: usize,
}

/// Free-space probe for the storage-pressure guard. Measurement is a
/// deployment concern, so it enters as a collaborator; without one the
/// guard is disabled.
pub trait StorageMonitor: Send + Sync {
    fn free_bytes(&self) -> std::io::Result<u64>;
}
