//! Candidate ranking and gating.

use chrono::Duration;
use tracing::debug;

use crate::quality::DelayProfile;
use crate::store::{GateChecks, StoreError};

use super::types::{Candidate, RankContext, Selection};

/// Rank scored candidates and walk the gating chain.
///
/// Non-rejected candidates are ordered by total score descending, with ties
/// broken by indexer priority ascending (lower number wins), publish date
/// descending (newer wins) and finally original discovery order. The first
/// candidate to pass the blocklist, indexer-exclusion and release-filter
/// gates wins; if an applicable, non-bypassed delay profile covers it the
/// decision is deferred instead, and the walk stops there for this cycle.
pub fn rank(
    candidates: &[Candidate],
    ctx: &RankContext,
    gates: &dyn GateChecks,
) -> Result<Selection, StoreError> {
    let mut order: Vec<usize> = (0..candidates.len())
        .filter(|&i| !candidates[i].scored.rejected)
        .collect();

    order.sort_by(|&a, &b| {
        let ca = &candidates[a];
        let cb = &candidates[b];
        cb.scored
            .total_score
            .cmp(&ca.scored.total_score)
            .then(ca.raw.indexer_priority.cmp(&cb.raw.indexer_priority))
            .then(cb.raw.publish_date.cmp(&ca.raw.publish_date))
            .then(a.cmp(&b))
    });

    for &i in &order {
        let candidate = &candidates[i];
        let title = &candidate.raw.title;

        if gates.is_blocklisted(title)? {
            debug!(title = %title, "candidate gated out: blocklisted");
            continue;
        }

        if let Some(library_id) = ctx.library_id {
            if gates.is_indexer_excluded(library_id, candidate.raw.indexer_id)? {
                debug!(
                    title = %title,
                    indexer = %candidate.raw.indexer_name,
                    "candidate gated out: indexer excluded for library"
                );
                continue;
            }
        }

        // First violated filter short-circuits
        if let Some(filter) = ctx.filters.iter().find(|f| f.violated_by(title)) {
            debug!(title = %title, filter = %filter.value, "candidate gated out: release filter");
            continue;
        }

        if let Some(profile) = applicable_delay(candidate, ctx) {
            let available_at = ctx.now + Duration::minutes(i64::from(profile.delay_minutes));
            debug!(
                title = %title,
                delay_minutes = profile.delay_minutes,
                "candidate deferred by delay profile"
            );
            return Ok(Selection::Deferred {
                candidate: candidate.clone(),
                available_at,
            });
        }

        return Ok(Selection::Selected(candidate.clone()));
    }

    Ok(Selection::NoneAcceptable)
}

/// The first in-scope delay profile the candidate does not bypass.
/// Library-scoped profiles take precedence over global ones.
fn applicable_delay<'a>(candidate: &Candidate, ctx: &'a RankContext) -> Option<&'a DelayProfile> {
    let in_scope = |profile: &DelayProfile| match ctx.library_id {
        Some(library_id) => profile.applies_to(library_id),
        None => profile.enabled && profile.library_id.is_none(),
    };

    let mut profiles: Vec<&DelayProfile> =
        ctx.delay_profiles.iter().filter(|p| in_scope(p)).collect();
    profiles.sort_by_key(|p| p.library_id.is_none());

    profiles.into_iter().find(|p| {
        !p.bypassed_by(
            candidate.scored.parsed.resolution,
            candidate.scored.parsed.source,
            candidate.scored.total_score,
        )
    })
}
