//! Quality profiles and the release-gating policy types scoped to them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::parser::{Resolution, Source};

use super::tier::QualityTier;

/// A named bundle of accepted tiers, thresholds and custom-format weights
/// that parameterizes scoring for a library.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QualityProfile {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    /// Tiers this profile accepts, in preference order.
    pub allowed_tiers: Vec<QualityTier>,
    #[serde(default)]
    pub upgrade_allowed: bool,
    /// Minimum score gain an upgrade must bring over the owned copy.
    #[serde(default)]
    pub upgrade_until_score: i32,
    /// Total score below which a release is rejected outright.
    #[serde(default)]
    pub min_format_score: i32,
    /// Owned-copy score at which upgrading stops.
    #[serde(default)]
    pub cutoff_format_score: i32,
    /// Per-format weight overrides, keyed by format id. A format absent from
    /// this map contributes nothing for this profile.
    #[serde(default)]
    pub format_scores: HashMap<i64, i32>,
}

impl QualityProfile {
    /// Weight of a custom format under this profile (0 when unreferenced).
    pub fn format_weight(&self, format_id: i64) -> i32 {
        self.format_scores.get(&format_id).copied().unwrap_or(0)
    }
}

/// A policy postponing an otherwise acceptable grab so better candidates can
/// appear. Scoped to one library or global (`library_id` unset).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DelayProfile {
    #[serde(default)]
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_id: Option<i64>,
    pub delay_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bypass_if_resolution: Option<Resolution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bypass_if_source: Option<Source>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bypass_if_score_above: Option<i32>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl DelayProfile {
    /// Whether this profile is in scope for the given library.
    pub fn applies_to(&self, library_id: i64) -> bool {
        self.enabled && self.library_id.map_or(true, |id| id == library_id)
    }

    /// Whether a candidate skips the delay entirely. Any matching bypass
    /// predicate is enough.
    pub fn bypassed_by(
        &self,
        resolution: Option<Resolution>,
        source: Option<Source>,
        total_score: i32,
    ) -> bool {
        if let (Some(bypass), Some(actual)) = (self.bypass_if_resolution, resolution) {
            if bypass == actual {
                return true;
            }
        }
        if let (Some(bypass), Some(actual)) = (self.bypass_if_source, source) {
            if bypass == actual {
                return true;
            }
        }
        if let Some(threshold) = self.bypass_if_score_above {
            if total_score > threshold {
                return true;
            }
        }
        false
    }
}

/// Textual release filter attached to a quality profile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    MustContain,
    MustNotContain,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseFilter {
    #[serde(default)]
    pub id: i64,
    pub profile_id: i64,
    pub filter_type: FilterType,
    pub value: String,
    #[serde(default)]
    pub is_regex: bool,
}

impl ReleaseFilter {
    /// Whether the filter text matches the title. Regex filters are
    /// case-insensitive; an invalid pattern falls back to a plain
    /// case-insensitive substring match.
    fn matches(&self, title: &str) -> bool {
        if self.is_regex {
            if let Ok(pattern) = regex_lite::Regex::new(&format!("(?i){}", self.value)) {
                return pattern.is_match(title);
            }
        }
        title.to_lowercase().contains(&self.value.to_lowercase())
    }

    /// Whether the candidate title violates this filter.
    pub fn violated_by(&self, title: &str) -> bool {
        match self.filter_type {
            FilterType::MustContain => !self.matches(title),
            FilterType::MustNotContain => self.matches(title),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delay_profile() -> DelayProfile {
        DelayProfile {
            id: 1,
            library_id: None,
            delay_minutes: 120,
            bypass_if_resolution: None,
            bypass_if_source: None,
            bypass_if_score_above: None,
            enabled: true,
        }
    }

    #[test]
    fn test_profile_format_weight_defaults_to_zero() {
        let mut profile = QualityProfile {
            id: 1,
            name: "HD".to_string(),
            allowed_tiers: vec![QualityTier::Web1080, QualityTier::Bluray1080],
            upgrade_allowed: false,
            upgrade_until_score: 0,
            min_format_score: 0,
            cutoff_format_score: 0,
            format_scores: HashMap::new(),
        };
        profile.format_scores.insert(7, 25);
        assert_eq!(profile.format_weight(7), 25);
        assert_eq!(profile.format_weight(8), 0);
    }

    #[test]
    fn test_delay_profile_scoping() {
        let global = delay_profile();
        assert!(global.applies_to(1));
        assert!(global.applies_to(99));

        let mut scoped = delay_profile();
        scoped.library_id = Some(3);
        assert!(scoped.applies_to(3));
        assert!(!scoped.applies_to(4));

        let mut disabled = delay_profile();
        disabled.enabled = false;
        assert!(!disabled.applies_to(1));
    }

    #[test]
    fn test_delay_bypass_by_score() {
        let mut profile = delay_profile();
        profile.bypass_if_score_above = Some(150);
        assert!(profile.bypassed_by(None, None, 200));
        assert!(!profile.bypassed_by(None, None, 100));
        // Exactly at the threshold is not above it
        assert!(!profile.bypassed_by(None, None, 150));
    }

    #[test]
    fn test_delay_bypass_by_resolution_and_source() {
        let mut profile = delay_profile();
        profile.bypass_if_resolution = Some(Resolution::R2160);
        assert!(profile.bypassed_by(Some(Resolution::R2160), None, 0));
        assert!(!profile.bypassed_by(Some(Resolution::R1080), None, 0));
        assert!(!profile.bypassed_by(None, None, 0));

        let mut profile = delay_profile();
        profile.bypass_if_source = Some(Source::Remux);
        assert!(profile.bypassed_by(None, Some(Source::Remux), 0));
        assert!(!profile.bypassed_by(None, Some(Source::Bluray), 0));
    }

    #[test]
    fn test_must_contain_filter() {
        let filter = ReleaseFilter {
            id: 1,
            profile_id: 1,
            filter_type: FilterType::MustContain,
            value: "x265".to_string(),
            is_regex: false,
        };
        assert!(!filter.violated_by("Movie.2160p.WEB-DL.X265-GRP"));
        assert!(filter.violated_by("Movie.2160p.WEB-DL.x264-GRP"));
    }

    #[test]
    fn test_must_not_contain_filter() {
        let filter = ReleaseFilter {
            id: 1,
            profile_id: 1,
            filter_type: FilterType::MustNotContain,
            value: "CAM".to_string(),
            is_regex: false,
        };
        assert!(filter.violated_by("Movie.2023.CAM.x264"));
        assert!(!filter.violated_by("Movie.2023.1080p.BluRay.x264"));
    }

    #[test]
    fn test_regex_filter_is_case_insensitive() {
        let filter = ReleaseFilter {
            id: 1,
            profile_id: 1,
            filter_type: FilterType::MustNotContain,
            value: r"\b(hc|korsub)\b".to_string(),
            is_regex: true,
        };
        assert!(filter.violated_by("Movie 1080p HC WEBRip"));
        assert!(filter.violated_by("Movie 1080p KORSUB HDRip"));
        assert!(!filter.violated_by("Movie 1080p BluRay"));
    }

    #[test]
    fn test_invalid_regex_falls_back_to_substring() {
        let filter = ReleaseFilter {
            id: 1,
            profile_id: 1,
            filter_type: FilterType::MustContain,
            value: "(unclosed".to_string(),
            is_regex: true,
        };
        assert!(!filter.violated_by("weird (unclosed title"));
        assert!(filter.violated_by("normal title"));
    }
}
