//! Types for candidate ranking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::quality::{DelayProfile, ReleaseFilter};
use crate::scoring::ScoredRelease;
use crate::searcher::RawSearchResult;

/// A scored release paired with the raw indexer result it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub raw: RawSearchResult,
    pub scored: ScoredRelease,
}

/// Everything the gating chain needs besides the candidates themselves.
/// `now` is supplied by the caller so ranking stays deterministic.
#[derive(Debug, Clone)]
pub struct RankContext {
    /// Library the decision is for; indexer exclusions and library-scoped
    /// delay profiles only apply when set.
    pub library_id: Option<i64>,
    /// The profile's release filters, in definition order.
    pub filters: Vec<ReleaseFilter>,
    pub delay_profiles: Vec<DelayProfile>,
    pub now: DateTime<Utc>,
}

impl RankContext {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            library_id: None,
            filters: Vec::new(),
            delay_profiles: Vec::new(),
            now,
        }
    }
}

/// Outcome of ranking a batch of candidates.
#[derive(Debug, Clone)]
pub enum Selection {
    /// This candidate passed every gate; grab it.
    Selected(Candidate),
    /// A delay profile applies: do not grab now, revisit at `available_at`.
    Deferred {
        candidate: Candidate,
        available_at: DateTime<Utc>,
    },
    /// No candidate survived scoring and gating. Not an error.
    NoneAcceptable,
}
