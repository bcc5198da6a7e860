//! Release title parser.
//!
//! Turns a raw release title ("Movie.Name.2020.1080p.BluRay.x264-GROUP")
//! into a structured [`ParsedRelease`]. Parsing never fails: tokens that
//! aren't recognized simply leave their field unset.

mod rules;
mod types;

pub use types::{Codec, HdrFormat, ParsedRelease, Resolution, Source};

use chrono::{Datelike, Utc};

use rules::*;

/// Parse a raw release title into structured attributes.
///
/// Deterministic and side-effect free; safe to call concurrently.
pub fn parse(title: &str) -> ParsedRelease {
    let mut parsed = ParsedRelease::new(title);

    // Separators become spaces, parentheses open up, bracketed metadata
    // groups ("[SubsPlease]", "[ABCD1234]") are dropped entirely. The
    // original title is kept aside for the release-group suffix check.
    let normalized = normalize_separators(title);
    let opened = normalized.replace(['(', ')'], " ");
    let scanned = BRACKET_GROUPS.replace_all(&opened, " ").into_owned();

    parsed.year = extract_year(&scanned, Utc::now().year() + 2);
    parsed.resolution = first_match(&RESOLUTION_RULES, &scanned);
    parsed.source = first_match(&SOURCE_RULES, &scanned);
    parsed.codec = first_match(&CODEC_RULES, &scanned);
    parsed.audio_codec = first_match(&AUDIO_CODEC_RULES, &scanned).map(str::to_string);
    parsed.audio_channels = AUDIO_CHANNELS
        .captures(&scanned)
        .map(|c| c[1].to_string());
    parsed.hdr_formats = extract_hdr(&scanned);
    parsed.proper = PROPER.is_match(&scanned);
    parsed.repack = REPACK.is_match(&scanned);
    parsed.edition = first_match(&EDITION_RULES, &scanned).map(str::to_string);

    if let Some(caps) = SEASON_EPISODE.captures(&scanned) {
        parsed.season = caps[1].parse().ok();
        parsed.episode = caps[2].parse().ok();
    } else if let Some(caps) = SEASON_ONLY.captures(&scanned) {
        parsed.season = caps
            .get(1)
            .or_else(|| caps.get(2))
            .and_then(|m| m.as_str().parse().ok());
    }

    // Trailing "-GROUP" on the unstripped title, unless the token is a
    // keyword or a bare number ("-1" season markers are not groups).
    if let Some(caps) = RELEASE_GROUP.captures(title) {
        let token = caps[1].to_string();
        if !is_known_keyword(&token) {
            parsed.release_group = Some(token);
        }
    }

    parsed
}

/// Replace dot/underscore separators with spaces. A dot between two digits
/// is kept so channel layouts ("5.1") survive normalization.
fn normalize_separators(title: &str) -> String {
    let chars: Vec<char> = title.chars().collect();
    let mut out = String::with_capacity(title.len());
    for (i, &c) in chars.iter().enumerate() {
        let replace = match c {
            '_' => true,
            '.' => {
                let prev_digit = i
                    .checked_sub(1)
                    .and_then(|j| chars.get(j))
                    .is_some_and(|p| p.is_ascii_digit());
                let next_digit = chars.get(i + 1).is_some_and(|n| n.is_ascii_digit());
                !(prev_digit && next_digit)
            }
            _ => false,
        };
        out.push(if replace { ' ' } else { c });
    }
    out
}

fn first_match<T: Copy>(rules: &[(regex_lite::Regex, T)], text: &str) -> Option<T> {
    rules.iter().find(|(p, _)| p.is_match(text)).map(|(_, v)| *v)
}

/// First standalone four-digit token in [1900, max_year].
fn extract_year(text: &str, max_year: i32) -> Option<i32> {
    for caps in YEAR.captures_iter(text) {
        if let Ok(year) = caps[1].parse::<i32>() {
            if (1900..=max_year).contains(&year) {
                return Some(year);
            }
        }
    }
    None
}

/// Collect every HDR tag, most specific pattern first so "HDR10+" isn't
/// claimed by the "HDR10" rule, then report formats in order of first
/// appearance in the title.
fn extract_hdr(text: &str) -> Vec<HdrFormat> {
    let mut spans: Vec<(usize, usize, HdrFormat)> = Vec::new();
    for (pattern, format) in HDR_RULES.iter() {
        for m in pattern.find_iter(text) {
            let overlaps = spans
                .iter()
                .any(|&(start, end, _)| m.start() < end && m.end() > start);
            if !overlaps {
                spans.push((m.start(), m.end(), *format));
            }
        }
    }
    spans.sort_by_key(|&(start, _, _)| start);

    let mut formats = Vec::new();
    for (_, _, format) in spans {
        if !formats.contains(&format) {
            formats.push(format);
        }
    }
    formats
}
