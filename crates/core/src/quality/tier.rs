//! Quality tier ladder.
//!
//! A tier is derived from the (source, resolution) pair of a parsed release.
//! Variant order IS the quality order (lowest first), so `Ord` on the enum
//! and `base_score()` always agree.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::parser::{ParsedRelease, Resolution, Source};

/// Totally ordered quality classification. Every release maps to exactly one
/// tier; a release with no recognizable source or resolution lands on
/// `Unknown` rather than failing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QualityTier {
    #[serde(rename = "Unknown")]
    Unknown,
    #[serde(rename = "SD-480p")]
    Sd480,
    #[serde(rename = "HDTV-720p")]
    Hdtv720,
    #[serde(rename = "WEB-720p")]
    Web720,
    #[serde(rename = "BluRay-720p")]
    Bluray720,
    #[serde(rename = "HDTV-1080p")]
    Hdtv1080,
    #[serde(rename = "WEB-1080p")]
    Web1080,
    #[serde(rename = "BluRay-1080p")]
    Bluray1080,
    #[serde(rename = "REMUX-1080p")]
    Remux1080,
    #[serde(rename = "HDTV-2160p")]
    Hdtv2160,
    #[serde(rename = "WEB-2160p")]
    Web2160,
    #[serde(rename = "BluRay-2160p")]
    Bluray2160,
    #[serde(rename = "REMUX-2160p")]
    Remux2160,
}

impl QualityTier {
    /// Every tier, lowest to highest.
    pub const ALL: [QualityTier; 13] = [
        QualityTier::Unknown,
        QualityTier::Sd480,
        QualityTier::Hdtv720,
        QualityTier::Web720,
        QualityTier::Bluray720,
        QualityTier::Hdtv1080,
        QualityTier::Web1080,
        QualityTier::Bluray1080,
        QualityTier::Remux1080,
        QualityTier::Hdtv2160,
        QualityTier::Web2160,
        QualityTier::Bluray2160,
        QualityTier::Remux2160,
    ];

    /// Immutable base score. Strictly increasing along the tier order and
    /// never negative, so score ordering and tier ordering agree.
    pub fn base_score(&self) -> i32 {
        match self {
            QualityTier::Unknown => 5,
            QualityTier::Sd480 => 10,
            QualityTier::Hdtv720 => 20,
            QualityTier::Web720 => 30,
            QualityTier::Bluray720 => 40,
            QualityTier::Hdtv1080 => 50,
            QualityTier::Web1080 => 60,
            QualityTier::Bluray1080 => 70,
            QualityTier::Remux1080 => 80,
            QualityTier::Hdtv2160 => 90,
            QualityTier::Web2160 => 100,
            QualityTier::Bluray2160 => 110,
            QualityTier::Remux2160 => 120,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QualityTier::Unknown => "Unknown",
            QualityTier::Sd480 => "SD-480p",
            QualityTier::Hdtv720 => "HDTV-720p",
            QualityTier::Web720 => "WEB-720p",
            QualityTier::Bluray720 => "BluRay-720p",
            QualityTier::Hdtv1080 => "HDTV-1080p",
            QualityTier::Web1080 => "WEB-1080p",
            QualityTier::Bluray1080 => "BluRay-1080p",
            QualityTier::Remux1080 => "REMUX-1080p",
            QualityTier::Hdtv2160 => "HDTV-2160p",
            QualityTier::Web2160 => "WEB-2160p",
            QualityTier::Bluray2160 => "BluRay-2160p",
            QualityTier::Remux2160 => "REMUX-2160p",
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a parsed release into a tier and its base score.
///
/// Missing source or resolution degrades to the best partial match: a known
/// source with unknown resolution lands in that source's 720p band (REMUX
/// collapses into BluRay below 1080p), a known resolution with unknown
/// source lands in the HDTV band, and 480p collapses to the single SD tier.
pub fn classify_tier(parsed: &ParsedRelease) -> (QualityTier, i32) {
    use QualityTier::*;

    let tier = match (parsed.source, parsed.resolution) {
        (None, None) => Unknown,

        (_, Some(Resolution::R480)) => Sd480,
        (None, Some(Resolution::R720)) => Hdtv720,
        (None, Some(Resolution::R1080)) => Hdtv1080,
        (None, Some(Resolution::R2160)) => Hdtv2160,

        (Some(Source::Hdtv), Some(Resolution::R720)) => Hdtv720,
        (Some(Source::Hdtv), Some(Resolution::R1080)) => Hdtv1080,
        (Some(Source::Hdtv), Some(Resolution::R2160)) => Hdtv2160,
        (Some(Source::Hdtv), None) => Hdtv720,

        (Some(Source::WebRip) | Some(Source::WebDl), Some(Resolution::R720)) => Web720,
        (Some(Source::WebRip) | Some(Source::WebDl), Some(Resolution::R1080)) => Web1080,
        (Some(Source::WebRip) | Some(Source::WebDl), Some(Resolution::R2160)) => Web2160,
        (Some(Source::WebRip) | Some(Source::WebDl), None) => Web720,

        (Some(Source::Bluray), Some(Resolution::R720)) => Bluray720,
        (Some(Source::Bluray), Some(Resolution::R1080)) => Bluray1080,
        (Some(Source::Bluray), Some(Resolution::R2160)) => Bluray2160,
        (Some(Source::Bluray), None) => Bluray720,

        (Some(Source::Remux), Some(Resolution::R720)) => Bluray720,
        (Some(Source::Remux), Some(Resolution::R1080)) => Remux1080,
        (Some(Source::Remux), Some(Resolution::R2160)) => Remux2160,
        (Some(Source::Remux), None) => Bluray720,
    };

    (tier, tier.base_score())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn classify(title: &str) -> QualityTier {
        classify_tier(&parse(title)).0
    }

    #[test]
    fn test_base_scores_strictly_increase_with_tier_order() {
        for pair in QualityTier::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].base_score() < pair[1].base_score());
        }
    }

    #[test]
    fn test_base_scores_never_negative() {
        for tier in QualityTier::ALL {
            assert!(tier.base_score() > 0);
        }
    }

    #[test]
    fn test_classification_is_total() {
        let sources = [
            None,
            Some(Source::Hdtv),
            Some(Source::WebRip),
            Some(Source::WebDl),
            Some(Source::Bluray),
            Some(Source::Remux),
        ];
        let resolutions = [
            None,
            Some(Resolution::R480),
            Some(Resolution::R720),
            Some(Resolution::R1080),
            Some(Resolution::R2160),
        ];
        for source in sources {
            for resolution in resolutions {
                let mut parsed = ParsedRelease::new("x");
                parsed.source = source;
                parsed.resolution = resolution;
                let (tier, score) = classify_tier(&parsed);
                assert!(QualityTier::ALL.contains(&tier));
                assert_eq!(score, tier.base_score());
            }
        }
    }

    #[test]
    fn test_classify_common_releases() {
        assert_eq!(classify("Movie.2160p.REMUX.TrueHD-X"), QualityTier::Remux2160);
        assert_eq!(classify("Movie.2160p.BluRay.x265-X"), QualityTier::Bluray2160);
        assert_eq!(classify("Movie.2160p.WEB-DL.x265-X"), QualityTier::Web2160);
        assert_eq!(classify("Movie.1080p.BluRay.x264-X"), QualityTier::Bluray1080);
        assert_eq!(classify("Show.S01E01.1080p.WEBRip-X"), QualityTier::Web1080);
        assert_eq!(classify("Show.S01E01.720p.HDTV.x264-X"), QualityTier::Hdtv720);
        assert_eq!(classify("Movie.480p.DVDRip.XviD"), QualityTier::Sd480);
    }

    #[test]
    fn test_unknown_release_gets_lowest_tier() {
        let (tier, score) = classify_tier(&parse("totally opaque name"));
        assert_eq!(tier, QualityTier::Unknown);
        assert_eq!(score, 5);
    }

    #[test]
    fn test_partial_match_degradation() {
        // Source known, resolution missing
        assert_eq!(classify("Movie.BluRay.x264-X"), QualityTier::Bluray720);
        assert_eq!(classify("Show.S01E01.WEB-DL-X"), QualityTier::Web720);
        // Resolution known, source missing
        assert_eq!(classify("Movie.1080p.x264-X"), QualityTier::Hdtv1080);
        // 480p collapses regardless of source
        assert_eq!(classify("Movie.480p.BluRay.x264-X"), QualityTier::Sd480);
    }

    #[test]
    fn test_tier_serialization_labels() {
        assert_eq!(
            serde_json::to_string(&QualityTier::Web1080).unwrap(),
            "\"WEB-1080p\""
        );
        let tier: QualityTier = serde_json::from_str("\"REMUX-2160p\"").unwrap();
        assert_eq!(tier, QualityTier::Remux2160);
    }
}
