//! Candidate ranking: ordering competing scored releases and applying the
//! gating chain (blocklist, indexer exclusions, release filters, delay
//! profiles) to pick a winner or defer it.

mod rank;
mod types;

pub use rank::rank;
pub use types::{Candidate, RankContext, Selection};
