//! Types produced by the release title parser.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Video resolution extracted from a release title.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resolution {
    #[serde(rename = "480p")]
    R480,
    #[serde(rename = "720p")]
    R720,
    #[serde(rename = "1080p")]
    R1080,
    #[serde(rename = "2160p")]
    R2160,
}

impl Resolution {
    /// Canonical label as it appears on the wire ("2160p", "1080p", ...).
    pub fn label(&self) -> &'static str {
        match self {
            Resolution::R480 => "480p",
            Resolution::R720 => "720p",
            Resolution::R1080 => "1080p",
            Resolution::R2160 => "2160p",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Release source (media origin), ordered lowest to highest.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Source {
    #[serde(rename = "HDTV")]
    Hdtv,
    #[serde(rename = "WEBRip")]
    WebRip,
    #[serde(rename = "WEB-DL")]
    WebDl,
    #[serde(rename = "BluRay")]
    Bluray,
    #[serde(rename = "REMUX")]
    Remux,
}

impl Source {
    pub fn label(&self) -> &'static str {
        match self {
            Source::Hdtv => "HDTV",
            Source::WebRip => "WEBRip",
            Source::WebDl => "WEB-DL",
            Source::Bluray => "BluRay",
            Source::Remux => "REMUX",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Video codec extracted from a release title.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Codec {
    #[serde(rename = "x264/H264")]
    H264,
    #[serde(rename = "x265/HEVC")]
    Hevc,
    #[serde(rename = "AV1")]
    Av1,
}

impl Codec {
    pub fn label(&self) -> &'static str {
        match self {
            Codec::H264 => "x264/H264",
            Codec::Hevc => "x265/HEVC",
            Codec::Av1 => "AV1",
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// HDR metadata formats. A release can advertise several at once
/// (e.g. HDR10 base layer plus Dolby Vision).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum HdrFormat {
    #[serde(rename = "HDR10")]
    Hdr10,
    #[serde(rename = "HDR10+")]
    Hdr10Plus,
    #[serde(rename = "DV")]
    DolbyVision,
    #[serde(rename = "HLG")]
    Hlg,
}

impl HdrFormat {
    pub fn label(&self) -> &'static str {
        match self {
            HdrFormat::Hdr10 => "HDR10",
            HdrFormat::Hdr10Plus => "HDR10+",
            HdrFormat::DolbyVision => "DV",
            HdrFormat::Hlg => "HLG",
        }
    }
}

impl fmt::Display for HdrFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Structured attributes extracted from a raw release title.
///
/// Every field except `title` is optional: an unrecognized token leaves the
/// field unset, it is never an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParsedRelease {
    /// The raw title this was parsed from.
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec: Option<Codec>,
    /// Audio codec token ("TrueHD", "DTS-HD", "DDP", "AAC", ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_codec: Option<String>,
    /// Channel layout token ("7.1", "5.1", "2.0").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_channels: Option<String>,
    /// All HDR formats found, in order of first appearance.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hdr_formats: Vec<HdrFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_group: Option<String>,
    #[serde(default)]
    pub proper: bool,
    #[serde(default)]
    pub repack: bool,
    /// Named edition ("Director's Cut", "Extended", ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
}

impl ParsedRelease {
    /// Create an empty parse result for the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            year: None,
            resolution: None,
            source: None,
            codec: None,
            audio_codec: None,
            audio_channels: None,
            hdr_formats: Vec::new(),
            release_group: None,
            proper: false,
            repack: false,
            edition: None,
            season: None,
            episode: None,
        }
    }

    /// A season number without an episode number marks a season pack.
    pub fn is_season_pack(&self) -> bool {
        self.season.is_some() && self.episode.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_serialization() {
        assert_eq!(serde_json::to_string(&Resolution::R2160).unwrap(), "\"2160p\"");
        assert_eq!(serde_json::to_string(&Resolution::R480).unwrap(), "\"480p\"");
        let parsed: Resolution = serde_json::from_str("\"1080p\"").unwrap();
        assert_eq!(parsed, Resolution::R1080);
    }

    #[test]
    fn test_source_ordering() {
        assert!(Source::Remux > Source::Bluray);
        assert!(Source::Bluray > Source::WebDl);
        assert!(Source::WebDl > Source::WebRip);
        assert!(Source::WebRip > Source::Hdtv);
    }

    #[test]
    fn test_source_serialization() {
        assert_eq!(serde_json::to_string(&Source::WebDl).unwrap(), "\"WEB-DL\"");
        assert_eq!(serde_json::to_string(&Source::Remux).unwrap(), "\"REMUX\"");
    }

    #[test]
    fn test_hdr_format_labels() {
        assert_eq!(HdrFormat::Hdr10Plus.label(), "HDR10+");
        assert_eq!(HdrFormat::DolbyVision.label(), "DV");
    }

    #[test]
    fn test_season_pack_detection() {
        let mut parsed = ParsedRelease::new("Show S02 1080p");
        parsed.season = Some(2);
        assert!(parsed.is_season_pack());

        parsed.episode = Some(5);
        assert!(!parsed.is_season_pack());

        let none = ParsedRelease::new("Movie 2020");
        assert!(!none.is_season_pack());
    }
}
