//! Keyword rule tables for the title parser.
//!
//! Each field is scanned against an ordered list of `(pattern, outcome)`
//! rules; the first matching rule wins. Priority lives in table order, so it
//! can be inspected and tested on its own instead of being buried in control
//! flow.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::types::{Codec, HdrFormat, Resolution, Source};

fn rx(pattern: &str) -> Regex {
    Regex::new(pattern).expect("invalid parser rule pattern")
}

/// Resolution keywords. "4k"/"UHD" are aliases for 2160p.
pub static RESOLUTION_RULES: Lazy<Vec<(Regex, Resolution)>> = Lazy::new(|| {
    vec![
        (rx(r"(?i)\b2160p\b|\b4k\b|\buhd\b"), Resolution::R2160),
        (rx(r"(?i)\b1080[pi]\b"), Resolution::R1080),
        (rx(r"(?i)\b720p\b"), Resolution::R720),
        (rx(r"(?i)\b480p\b|\bdvdrip\b"), Resolution::R480),
    ]
});

/// Source keywords in priority order: a remux tag wins over the BluRay tag
/// that usually accompanies it, and WEB-DL wins over a stray WEBRip token.
pub static SOURCE_RULES: Lazy<Vec<(Regex, Source)>> = Lazy::new(|| {
    vec![
        (rx(r"(?i)\bremux\b"), Source::Remux),
        (
            rx(r"(?i)\bblu[ ._-]?ray\b|\bbd[ ._-]?rip\b|\bbrrip\b"),
            Source::Bluray,
        ),
        (rx(r"(?i)\bweb[ ._-]?dl\b"), Source::WebDl),
        (rx(r"(?i)\bweb[ ._-]?rip\b"), Source::WebRip),
        (rx(r"(?i)\bhdtv\b"), Source::Hdtv),
    ]
});

/// Video codec keywords.
pub static CODEC_RULES: Lazy<Vec<(Regex, Codec)>> = Lazy::new(|| {
    vec![
        (rx(r"(?i)\bx265\b|\bh[ .]?265\b|\bhevc\b"), Codec::Hevc),
        (rx(r"(?i)\bx264\b|\bh[ .]?264\b|\bavc\b"), Codec::H264),
        (rx(r"(?i)\bav1\b"), Codec::Av1),
    ]
});

/// Audio codec keywords, most specific first ("DTS-HD" before "DTS",
/// "TrueHD" before the bare "DD" of a DD5.1 tag).
pub static AUDIO_CODEC_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (rx(r"(?i)\btrue[ ._-]?hd"), "TrueHD"),
        (rx(r"(?i)\bdts[ ._-]?hd"), "DTS-HD"),
        (rx(r"(?i)\bdts"), "DTS"),
        (rx(r"(?i)\bddp|\bdd\+|\be[ ._-]?ac[ ._-]?3\b"), "DDP"),
        (rx(r"(?i)\bdd[^a-z+]|\bdd$|\bac[ ._-]?3\b"), "DD"),
        (rx(r"(?i)\baac"), "AAC"),
        (rx(r"(?i)\bflac\b"), "FLAC"),
        (rx(r"(?i)\bopus\b"), "Opus"),
    ]
});

/// Channel layout token ("7.1", "5.1", "2.0"). No leading boundary: the
/// token is usually glued to the codec ("DDP5.1").
pub static AUDIO_CHANNELS: Lazy<Regex> = Lazy::new(|| rx(r"([2457]\.[01])\b"));

/// HDR formats, most specific first. All matches are collected, not just the
/// first: the scanner records every non-overlapping hit and reports them in
/// order of appearance in the title.
pub static HDR_RULES: Lazy<Vec<(Regex, HdrFormat)>> = Lazy::new(|| {
    vec![
        (rx(r"(?i)hdr10\+|\bhdr10p\b"), HdrFormat::Hdr10Plus),
        (rx(r"(?i)\bhdr10\b|\bhdr\b"), HdrFormat::Hdr10),
        (
            rx(r"(?i)\bdv\b|\bdovi\b|\bdolby[ ._-]?vision\b"),
            HdrFormat::DolbyVision,
        ),
        (rx(r"(?i)\bhlg\b"), HdrFormat::Hlg),
    ]
});

/// Named editions.
pub static EDITION_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (rx(r"(?i)\bdirector'?s[ ._-]?cut\b"), "Director's Cut"),
        (rx(r"(?i)\bextended\b"), "Extended"),
        (rx(r"(?i)\bremastered\b"), "Remastered"),
        (rx(r"(?i)\btheatrical\b"), "Theatrical"),
        (rx(r"(?i)\bunrated\b"), "Unrated"),
        (rx(r"(?i)\bimax\b"), "IMAX"),
    ]
});

/// Standalone four-digit year candidates; range-checked by the parser.
pub static YEAR: Lazy<Regex> = Lazy::new(|| rx(r"\b((?:19|20)\d{2})\b"));

/// S01E01-style single episode marker.
pub static SEASON_EPISODE: Lazy<Regex> =
    Lazy::new(|| rx(r"(?i)\bs(\d{1,2})[ ._-]?e(\d{1,3})\b"));

/// Season-only marker (season pack): "S02" or "Season 2".
pub static SEASON_ONLY: Lazy<Regex> =
    Lazy::new(|| rx(r"(?i)\bs(\d{1,2})\b|\bseason[ ._-]?(\d{1,2})\b"));

pub static PROPER: Lazy<Regex> = Lazy::new(|| rx(r"(?i)\bproper\b"));
pub static REPACK: Lazy<Regex> = Lazy::new(|| rx(r"(?i)\brepack\b"));

/// Bracketed metadata groups stripped before keyword scanning.
pub static BRACKET_GROUPS: Lazy<Regex> =
    Lazy::new(|| rx(r"\[[^\]]*\]|\{[^}]*\}"));

/// Trailing release-group segment on the unstripped title: "-GROUP" at the
/// end of the filename stem, optionally followed by a media file extension.
pub static RELEASE_GROUP: Lazy<Regex> =
    Lazy::new(|| rx(r"(?i)-([A-Za-z0-9]+)(?:\.(?:mkv|mp4|avi|m2ts|ts))?$"));

/// Whether a candidate release-group token is actually a known keyword
/// (resolution, source, codec, edition, ...) and must not be treated as a
/// group name.
pub fn is_known_keyword(token: &str) -> bool {
    if token.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }
    // Fragments of hyphenated keywords ("WEB-DL", "DTS-HD MA") that land at
    // the end of a title.
    if matches!(
        token.to_ascii_lowercase().as_str(),
        "dl" | "web" | "hd" | "ma" | "rip"
    ) {
        return true;
    }
    RESOLUTION_RULES.iter().any(|(p, _)| p.is_match(token))
        || SOURCE_RULES.iter().any(|(p, _)| p.is_match(token))
        || CODEC_RULES.iter().any(|(p, _)| p.is_match(token))
        || AUDIO_CODEC_RULES.iter().any(|(p, _)| p.is_match(token))
        || HDR_RULES.iter().any(|(p, _)| p.is_match(token))
        || EDITION_RULES.iter().any(|(p, _)| p.is_match(token))
        || PROPER.is_match(token)
        || REPACK.is_match(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_match<T: Copy>(rules: &[(Regex, T)], text: &str) -> Option<T> {
        rules.iter().find(|(p, _)| p.is_match(text)).map(|(_, v)| *v)
    }

    #[test]
    fn test_resolution_aliases() {
        assert_eq!(first_match(&RESOLUTION_RULES, "movie 4K remux"), Some(Resolution::R2160));
        assert_eq!(first_match(&RESOLUTION_RULES, "movie 2160p"), Some(Resolution::R2160));
        assert_eq!(first_match(&RESOLUTION_RULES, "movie 1080i hdtv"), Some(Resolution::R1080));
        assert_eq!(first_match(&RESOLUTION_RULES, "nothing here"), None);
    }

    #[test]
    fn test_source_priority_remux_wins() {
        // A remux release usually carries both tokens
        let title = "Movie 2160p BluRay REMUX";
        assert_eq!(first_match(&SOURCE_RULES, title), Some(Source::Remux));
    }

    #[test]
    fn test_source_separator_variants() {
        assert_eq!(first_match(&SOURCE_RULES, "show WEB-DL"), Some(Source::WebDl));
        assert_eq!(first_match(&SOURCE_RULES, "show WEB DL"), Some(Source::WebDl));
        assert_eq!(first_match(&SOURCE_RULES, "show Blu-ray"), Some(Source::Bluray));
        assert_eq!(first_match(&SOURCE_RULES, "show BDRip"), Some(Source::Bluray));
    }

    #[test]
    fn test_codec_aliases() {
        assert_eq!(first_match(&CODEC_RULES, "x265"), Some(Codec::Hevc));
        assert_eq!(first_match(&CODEC_RULES, "HEVC"), Some(Codec::Hevc));
        assert_eq!(first_match(&CODEC_RULES, "h 264"), Some(Codec::H264));
        assert_eq!(first_match(&CODEC_RULES, "AV1"), Some(Codec::Av1));
    }

    #[test]
    fn test_audio_codec_specificity() {
        assert_eq!(first_match(&AUDIO_CODEC_RULES, "DTS-HD MA"), Some("DTS-HD"));
        assert_eq!(first_match(&AUDIO_CODEC_RULES, "DTS 5.1"), Some("DTS"));
        assert_eq!(first_match(&AUDIO_CODEC_RULES, "DDP5.1"), Some("DDP"));
        assert_eq!(first_match(&AUDIO_CODEC_RULES, "TrueHD Atmos"), Some("TrueHD"));
    }

    #[test]
    fn test_dv_does_not_match_dvdrip() {
        let dv = &HDR_RULES[2].0;
        assert!(dv.is_match("movie DV 2160p"));
        assert!(!dv.is_match("movie DVDRip"));
    }

    #[test]
    fn test_year_boundaries() {
        assert!(YEAR.is_match("Movie 2020 1080p"));
        // Resolution digits must not look like a year
        assert!(!YEAR.is_match("2160p"));
        assert!(!YEAR.is_match("x26412345"));
    }

    #[test]
    fn test_release_group_pattern() {
        let caps = RELEASE_GROUP.captures("Movie.2020.1080p.BluRay.x264-GROUP").unwrap();
        assert_eq!(&caps[1], "GROUP");
        let caps = RELEASE_GROUP.captures("Show.S01E01.720p-TEAM.mkv").unwrap();
        assert_eq!(&caps[1], "TEAM");
        assert!(RELEASE_GROUP.captures("No Group Here").is_none());
    }

    #[test]
    fn test_is_known_keyword() {
        assert!(is_known_keyword("1080p"));
        assert!(is_known_keyword("REMUX"));
        assert!(is_known_keyword("x265"));
        assert!(is_known_keyword("1"));
        assert!(is_known_keyword("2020"));
        assert!(!is_known_keyword("SPARKS"));
        assert!(!is_known_keyword("NTb"));
    }
}
