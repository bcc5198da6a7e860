//! Release search abstraction.
//!
//! This module provides a `Searcher` trait for querying release indexes and
//! a Prowlarr-backed implementation.

mod prowlarr;
mod types;

pub use prowlarr::ProwlarrSearcher;
pub use types::*;
