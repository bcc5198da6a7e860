//! Custom formats: named rule-sets that tag releases for per-profile
//! score adjustments.
//!
//! A condition is a closed tagged variant, one per supported field, and is
//! evaluated by exhaustive pattern match. A format matches a release iff
//! every one of its conditions holds (pure AND); OR semantics are composed
//! by defining several formats.

use serde::{Deserialize, Serialize};

use crate::parser::{Codec, HdrFormat, ParsedRelease, Resolution, Source};

/// Operators available on enum-valued fields.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EqOp {
    Eq,
    NotEq,
}

/// Operators available on text fields.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TextOp {
    Eq,
    NotEq,
    Contains,
    NotContains,
    Regex,
}

/// Membership operators for the HDR set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MemberOp {
    Contains,
    NotContains,
}

/// A single matching condition against one parsed-release field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "field", rename_all = "snake_case")]
pub enum Condition {
    Resolution { op: EqOp, value: Resolution },
    Source { op: EqOp, value: Source },
    Codec { op: EqOp, value: Codec },
    AudioCodec { op: TextOp, value: String },
    Hdr { op: MemberOp, value: HdrFormat },
    ReleaseGroup { op: TextOp, value: String },
    Title { op: TextOp, value: String },
    Proper { value: bool },
    Repack { value: bool },
    SeasonPack { value: bool },
}

impl Condition {
    /// Evaluate this condition against a parsed release. Side-effect free
    /// and commutative with its siblings: evaluation order never changes
    /// the outcome.
    pub fn evaluate(&self, parsed: &ParsedRelease) -> bool {
        match self {
            Condition::Resolution { op, value } => eq_op(*op, parsed.resolution, *value),
            Condition::Source { op, value } => eq_op(*op, parsed.source, *value),
            Condition::Codec { op, value } => eq_op(*op, parsed.codec, *value),
            Condition::AudioCodec { op, value } => {
                text_op(*op, parsed.audio_codec.as_deref(), value)
            }
            Condition::Hdr { op, value } => {
                let present = parsed.hdr_formats.contains(value);
                match op {
                    MemberOp::Contains => present,
                    MemberOp::NotContains => !present,
                }
            }
            Condition::ReleaseGroup { op, value } => {
                text_op(*op, parsed.release_group.as_deref(), value)
            }
            Condition::Title { op, value } => text_op(*op, Some(&parsed.title), value),
            Condition::Proper { value } => parsed.proper == *value,
            Condition::Repack { value } => parsed.repack == *value,
            Condition::SeasonPack { value } => parsed.is_season_pack() == *value,
        }
    }
}

/// Equality on an optional enum field. An unset field never equals anything,
/// so `not_eq` holds for it.
fn eq_op<T: PartialEq>(op: EqOp, actual: Option<T>, expected: T) -> bool {
    let equal = actual.map_or(false, |a| a == expected);
    match op {
        EqOp::Eq => equal,
        EqOp::NotEq => !equal,
    }
}

/// Text comparison, case-insensitive throughout. An unset field matches no
/// positive operator and every negative one.
fn text_op(op: TextOp, actual: Option<&str>, expected: &str) -> bool {
    let positive = match op {
        TextOp::Eq | TextOp::NotEq => actual.map_or(false, |a| a.eq_ignore_ascii_case(expected)),
        TextOp::Contains | TextOp::NotContains => actual
            .map_or(false, |a| a.to_lowercase().contains(&expected.to_lowercase())),
        TextOp::Regex => actual.map_or(false, |a| {
            regex_lite::Regex::new(&format!("(?i){expected}"))
                .map(|p| p.is_match(a))
                .unwrap_or(false)
        }),
    };
    match op {
        TextOp::NotEq | TextOp::NotContains => !positive,
        _ => positive,
    }
}

/// A named rule-set. Matches a release iff all conditions hold.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomFormatDef {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub conditions: Vec<Condition>,
}

impl CustomFormatDef {
    pub fn matches(&self, parsed: &ParsedRelease) -> bool {
        self.conditions.iter().all(|c| c.evaluate(parsed))
    }
}

/// Evaluate a list of formats against a release, returning those that match.
pub fn match_formats<'a>(
    parsed: &ParsedRelease,
    formats: &'a [CustomFormatDef],
) -> Vec<&'a CustomFormatDef> {
    formats.iter().filter(|f| f.matches(parsed)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn format(name: &str, conditions: Vec<Condition>) -> CustomFormatDef {
        CustomFormatDef {
            id: 1,
            name: name.to_string(),
            conditions,
        }
    }

    #[test]
    fn test_resolution_condition() {
        let parsed = parse("Movie.2160p.WEB-DL.x265");
        assert!(Condition::Resolution {
            op: EqOp::Eq,
            value: Resolution::R2160
        }
        .evaluate(&parsed));
        assert!(!Condition::Resolution {
            op: EqOp::Eq,
            value: Resolution::R1080
        }
        .evaluate(&parsed));
        assert!(Condition::Resolution {
            op: EqOp::NotEq,
            value: Resolution::R1080
        }
        .evaluate(&parsed));
    }

    #[test]
    fn test_unset_field_equality() {
        let parsed = parse("opaque name");
        let eq = Condition::Source {
            op: EqOp::Eq,
            value: Source::Bluray,
        };
        let not_eq = Condition::Source {
            op: EqOp::NotEq,
            value: Source::Bluray,
        };
        assert!(!eq.evaluate(&parsed));
        assert!(not_eq.evaluate(&parsed));
    }

    #[test]
    fn test_hdr_membership() {
        let parsed = parse("Movie.2160p.REMUX.HDR10.DV.TrueHD.7.1-XYZ");
        assert!(Condition::Hdr {
            op: MemberOp::Contains,
            value: HdrFormat::DolbyVision
        }
        .evaluate(&parsed));
        assert!(!Condition::Hdr {
            op: MemberOp::Contains,
            value: HdrFormat::Hlg
        }
        .evaluate(&parsed));
        assert!(Condition::Hdr {
            op: MemberOp::NotContains,
            value: HdrFormat::Hlg
        }
        .evaluate(&parsed));
    }

    #[test]
    fn test_release_group_text_ops() {
        let parsed = parse("Movie.2020.1080p.BluRay.x264-SPARKS");
        assert!(Condition::ReleaseGroup {
            op: TextOp::Eq,
            value: "sparks".to_string()
        }
        .evaluate(&parsed));
        assert!(Condition::ReleaseGroup {
            op: TextOp::Regex,
            value: "^(sparks|ntb)$".to_string()
        }
        .evaluate(&parsed));
        assert!(!Condition::ReleaseGroup {
            op: TextOp::Eq,
            value: "NTb".to_string()
        }
        .evaluate(&parsed));
    }

    #[test]
    fn test_unset_text_field_negative_ops_hold() {
        let parsed = parse("Movie.2020.1080p.BluRay.x264");
        assert!(parsed.release_group.is_none());
        assert!(!Condition::ReleaseGroup {
            op: TextOp::Contains,
            value: "grp".to_string()
        }
        .evaluate(&parsed));
        assert!(Condition::ReleaseGroup {
            op: TextOp::NotContains,
            value: "grp".to_string()
        }
        .evaluate(&parsed));
    }

    #[test]
    fn test_title_contains() {
        let parsed = parse("Movie.2020.Hybrid.2160p.WEB-DL");
        assert!(Condition::Title {
            op: TextOp::Contains,
            value: "hybrid".to_string()
        }
        .evaluate(&parsed));
    }

    #[test]
    fn test_boolean_fields() {
        let parsed = parse("Movie.2020.PROPER.1080p.WEB-DL");
        assert!(Condition::Proper { value: true }.evaluate(&parsed));
        assert!(!Condition::Repack { value: true }.evaluate(&parsed));
        assert!(Condition::Repack { value: false }.evaluate(&parsed));
    }

    #[test]
    fn test_season_pack_condition() {
        let pack = parse("Show.S02.1080p.WEB-DL");
        let episode = parse("Show.S02E04.1080p.WEB-DL");
        let condition = Condition::SeasonPack { value: true };
        assert!(condition.evaluate(&pack));
        assert!(!condition.evaluate(&episode));
    }

    #[test]
    fn test_format_requires_all_conditions() {
        let def = format(
            "UHD Remux",
            vec![
                Condition::Source {
                    op: EqOp::Eq,
                    value: Source::Remux,
                },
                Condition::Resolution {
                    op: EqOp::Eq,
                    value: Resolution::R2160,
                },
            ],
        );
        assert!(def.matches(&parse("Movie.2160p.REMUX.TrueHD")));
        assert!(!def.matches(&parse("Movie.1080p.REMUX.TrueHD")));
        assert!(!def.matches(&parse("Movie.2160p.WEB-DL.x265")));
    }

    #[test]
    fn test_match_formats_returns_all_matching() {
        let formats = vec![
            format(
                "HDR",
                vec![Condition::Hdr {
                    op: MemberOp::Contains,
                    value: HdrFormat::Hdr10,
                }],
            ),
            CustomFormatDef {
                id: 2,
                name: "HEVC".to_string(),
                conditions: vec![Condition::Codec {
                    op: EqOp::Eq,
                    value: Codec::Hevc,
                }],
            },
            CustomFormatDef {
                id: 3,
                name: "Remux".to_string(),
                conditions: vec![Condition::Source {
                    op: EqOp::Eq,
                    value: Source::Remux,
                }],
            },
        ];
        let parsed = parse("Movie.2160p.WEB-DL.HDR10.x265-GRP");
        let matched = match_formats(&parsed, &formats);
        let names: Vec<&str> = matched.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["HDR", "HEVC"]);
    }

    #[test]
    fn test_condition_order_does_not_matter() {
        let a = format(
            "x",
            vec![
                Condition::Proper { value: false },
                Condition::Codec {
                    op: EqOp::Eq,
                    value: Codec::H264,
                },
            ],
        );
        let b = format(
            "x",
            vec![
                Condition::Codec {
                    op: EqOp::Eq,
                    value: Codec::H264,
                },
                Condition::Proper { value: false },
            ],
        );
        let parsed = parse("Movie.1080p.BluRay.x264-GRP");
        assert_eq!(a.matches(&parsed), b.matches(&parsed));
    }

    #[test]
    fn test_condition_serialization_round_trip() {
        let condition = Condition::Hdr {
            op: MemberOp::Contains,
            value: HdrFormat::Hdr10Plus,
        };
        let json = serde_json::to_string(&condition).unwrap();
        assert!(json.contains("\"field\":\"hdr\""));
        let parsed: Condition = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, condition);

        let title_regex: Condition = serde_json::from_str(
            r#"{"field":"title","op":"regex","value":"\\bimax\\b"}"#,
        )
        .unwrap();
        assert!(matches!(title_regex, Condition::Title { op: TextOp::Regex, .. }));
    }
}
