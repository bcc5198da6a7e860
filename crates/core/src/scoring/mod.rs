//! Release scoring.
//!
//! Combines the tier base score with profile-weighted custom-format hits
//! into a total score and an accept/reject verdict. Pure: the result is a
//! function of its inputs alone.

use serde::{Deserialize, Serialize};

use crate::parser::ParsedRelease;
use crate::quality::{classify_tier, match_formats, CustomFormatDef, QualityProfile, QualityTier};

/// Rejection reasons, in the order the checks run. The first failing check
/// names the reason so diagnostics stay stable.
pub const REJECT_UNSUPPORTED_QUALITY: &str = "unsupported quality";
pub const REJECT_BELOW_MIN_SCORE: &str = "below minimum format score";
pub const REJECT_NO_UPGRADE_NEEDED: &str = "no upgrade needed";

/// A custom format that matched a release, with its profile weight.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormatHit {
    pub name: String,
    pub score: i32,
}

/// A parsed release with its scoring verdict attached.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoredRelease {
    #[serde(flatten)]
    pub parsed: ParsedRelease,
    pub tier: QualityTier,
    pub base_score: i32,
    pub format_hits: Vec<FormatHit>,
    pub total_score: i32,
    pub rejected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

/// Score a parsed release against a profile and a set of custom formats.
///
/// With no profile (quick/unauthenticated scoring paths) the result is the
/// tier base score alone and nothing is rejected. `owned_score` is the score
/// of an already-owned copy; when absent the release is always eligible and
/// no upgrade comparison runs.
pub fn score_release(
    parsed: &ParsedRelease,
    profile: Option<&QualityProfile>,
    formats: &[CustomFormatDef],
    owned_score: Option<i32>,
) -> ScoredRelease {
    let (tier, base_score) = classify_tier(parsed);

    let format_hits: Vec<FormatHit> = match_formats(parsed, formats)
        .into_iter()
        .map(|f| FormatHit {
            name: f.name.clone(),
            score: profile.map_or(0, |p| p.format_weight(f.id)),
        })
        .collect();

    let total_score = base_score + format_hits.iter().map(|h| h.score).sum::<i32>();

    let rejection_reason = profile.and_then(|p| first_rejection(p, tier, total_score, owned_score));

    ScoredRelease {
        parsed: parsed.clone(),
        tier,
        base_score,
        format_hits,
        total_score,
        rejected: rejection_reason.is_some(),
        rejection_reason,
    }
}

/// The checks run in a fixed order and the first failure wins; any failing
/// check alone is enough to reject.
fn first_rejection(
    profile: &QualityProfile,
    tier: QualityTier,
    total_score: i32,
    owned_score: Option<i32>,
) -> Option<String> {
    if !profile.allowed_tiers.contains(&tier) {
        return Some(REJECT_UNSUPPORTED_QUALITY.to_string());
    }
    if total_score < profile.min_format_score {
        return Some(REJECT_BELOW_MIN_SCORE.to_string());
    }
    if let Some(owned) = owned_score {
        if !profile.upgrade_allowed {
            return Some(REJECT_NO_UPGRADE_NEEDED.to_string());
        }
        if profile.cutoff_format_score > 0 && owned >= profile.cutoff_format_score {
            return Some(REJECT_NO_UPGRADE_NEEDED.to_string());
        }
        if total_score < owned + profile.upgrade_until_score {
            return Some(REJECT_NO_UPGRADE_NEEDED.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::quality::{Condition, EqOp};
    use std::collections::HashMap;

    fn hd_profile() -> QualityProfile {
        QualityProfile {
            id: 1,
            name: "HD".to_string(),
            allowed_tiers: vec![
                QualityTier::Web1080,
                QualityTier::Bluray1080,
                QualityTier::Remux1080,
            ],
            upgrade_allowed: true,
            upgrade_until_score: 10,
            min_format_score: 0,
            cutoff_format_score: 0,
            format_scores: HashMap::new(),
        }
    }

    fn hevc_format(id: i64) -> CustomFormatDef {
        CustomFormatDef {
            id,
            name: "HEVC".to_string(),
            conditions: vec![Condition::Codec {
                op: EqOp::Eq,
                value: crate::parser::Codec::Hevc,
            }],
        }
    }

    #[test]
    fn test_score_accepted_release() {
        let parsed = parse("Movie.2020.1080p.BluRay.x265-GRP");
        let mut profile = hd_profile();
        profile.format_scores.insert(5, 30);

        let scored = score_release(&parsed, Some(&profile), &[hevc_format(5)], None);
        assert!(!scored.rejected);
        assert_eq!(scored.tier, QualityTier::Bluray1080);
        assert_eq!(scored.base_score, QualityTier::Bluray1080.base_score());
        assert_eq!(scored.format_hits.len(), 1);
        assert_eq!(scored.format_hits[0].score, 30);
        assert_eq!(scored.total_score, scored.base_score + 30);
    }

    #[test]
    fn test_unsupported_tier_rejected_regardless_of_format_score() {
        let parsed = parse("Show.S01E01.720p.WEB-DL.x265-GRP");
        let mut profile = hd_profile();
        // Huge format bonus must not rescue a disallowed tier
        profile.format_scores.insert(5, 1000);

        let scored = score_release(&parsed, Some(&profile), &[hevc_format(5)], None);
        assert_eq!(scored.tier, QualityTier::Web720);
        assert!(scored.rejected);
        assert_eq!(
            scored.rejection_reason.as_deref(),
            Some(REJECT_UNSUPPORTED_QUALITY)
        );
    }

    #[test]
    fn test_below_minimum_format_score() {
        let parsed = parse("Movie.2020.1080p.WEB-DL.x264-GRP");
        let mut profile = hd_profile();
        profile.min_format_score = 500;

        let scored = score_release(&parsed, Some(&profile), &[], None);
        assert!(scored.rejected);
        assert_eq!(
            scored.rejection_reason.as_deref(),
            Some(REJECT_BELOW_MIN_SCORE)
        );
    }

    #[test]
    fn test_rejection_reason_reports_first_failing_check() {
        // Fails both the tier check and the min-score check; tier wins
        let parsed = parse("Show.720p.HDTV.x264");
        let mut profile = hd_profile();
        profile.min_format_score = 500;

        let scored = score_release(&parsed, Some(&profile), &[], None);
        assert_eq!(
            scored.rejection_reason.as_deref(),
            Some(REJECT_UNSUPPORTED_QUALITY)
        );
    }

    #[test]
    fn test_upgrade_requires_margin() {
        let parsed = parse("Movie.2020.1080p.BluRay.x264-GRP");
        let profile = hd_profile(); // upgrade_until_score = 10
        let base = QualityTier::Bluray1080.base_score();

        // Owned copy close below: gain under the margin, no upgrade
        let scored = score_release(&parsed, Some(&profile), &[], Some(base - 5));
        assert!(scored.rejected);
        assert_eq!(
            scored.rejection_reason.as_deref(),
            Some(REJECT_NO_UPGRADE_NEEDED)
        );

        // Owned copy far enough below: upgrade allowed
        let scored = score_release(&parsed, Some(&profile), &[], Some(base - 20));
        assert!(!scored.rejected);
    }

    #[test]
    fn test_upgrade_disallowed_by_profile() {
        let parsed = parse("Movie.2020.1080p.BluRay.x264-GRP");
        let mut profile = hd_profile();
        profile.upgrade_allowed = false;

        let scored = score_release(&parsed, Some(&profile), &[], Some(1));
        assert!(scored.rejected);
        assert_eq!(
            scored.rejection_reason.as_deref(),
            Some(REJECT_NO_UPGRADE_NEEDED)
        );
    }

    #[test]
    fn test_owned_at_cutoff_stops_upgrades() {
        let parsed = parse("Movie.2020.1080p.REMUX.TrueHD-GRP");
        let mut profile = hd_profile();
        profile.cutoff_format_score = 70;

        let scored = score_release(&parsed, Some(&profile), &[], Some(70));
        assert!(scored.rejected);
        assert_eq!(
            scored.rejection_reason.as_deref(),
            Some(REJECT_NO_UPGRADE_NEEDED)
        );
    }

    #[test]
    fn test_no_owned_score_is_always_eligible() {
        let parsed = parse("Movie.2020.1080p.WEB-DL.x264-GRP");
        let mut profile = hd_profile();
        profile.upgrade_allowed = false; // irrelevant without an owned copy

        let scored = score_release(&parsed, Some(&profile), &[], None);
        assert!(!scored.rejected);
    }

    #[test]
    fn test_degraded_mode_without_profile() {
        let parsed = parse("Show.720p.HDTV.x265");
        let scored = score_release(&parsed, None, &[hevc_format(5)], Some(9999));
        assert!(!scored.rejected);
        assert_eq!(scored.total_score, scored.base_score);
        // Format still reported as matched, just unweighted
        assert_eq!(scored.format_hits.len(), 1);
        assert_eq!(scored.format_hits[0].score, 0);
    }

    #[test]
    fn test_unreferenced_format_contributes_nothing() {
        let parsed = parse("Movie.2020.1080p.BluRay.x265-GRP");
        let profile = hd_profile(); // no format_scores entries

        let scored = score_release(&parsed, Some(&profile), &[hevc_format(5)], None);
        assert_eq!(scored.format_hits[0].score, 0);
        assert_eq!(scored.total_score, scored.base_score);
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let parsed = parse("Movie.2160p.WEB-DL.HDR10.x265-GRP");
        let mut profile = hd_profile();
        profile.allowed_tiers.push(QualityTier::Web2160);
        profile.format_scores.insert(5, 12);
        let formats = [hevc_format(5)];

        let first = score_release(&parsed, Some(&profile), &formats, Some(40));
        let second = score_release(&parsed, Some(&profile), &formats, Some(40));
        assert_eq!(first, second);
    }
}
