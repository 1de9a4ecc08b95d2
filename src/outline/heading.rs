//! Heading grammar for seminar pages.
//!
//! Headings only count at depth 0; the same text deeper in the outline is
//! ordinary body content.

use std::sync::LazyLock;

use regex::Regex;

use super::Line;
use crate::constants::outline::{GROUP_MAX_DEPTH, GROUP_PATTERN, META_PATTERN, SPEAKER_PATTERN};

static SPEAKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SPEAKER_PATTERN).expect("speaker pattern is valid"));
static META_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(META_PATTERN).expect("meta pattern is valid"));
static GROUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(GROUP_PATTERN).expect("group pattern is valid"));

/// A depth-0 line that opens a new segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Heading<'a> {
    /// `[** 🎤name]`, carrying the trimmed name
    Speaker(&'a str),
    /// Reserved meta-notes marker
    Meta,
}

/// Classify a line as a segment heading.
///
/// Speaker headings win over meta headings when a line somehow matches both.
pub fn classify(line: &Line) -> Option<Heading<'_>> {
    if line.depth() != 0 {
        return None;
    }
    let raw = line.raw();
    if let Some(name) = speaker_name(raw) {
        return Some(Heading::Speaker(name));
    }
    is_meta(raw).then_some(Heading::Meta)
}

/// Presenter name of a speaker heading (indentation already stripped)
pub fn speaker_name(raw: &str) -> Option<&str> {
    SPEAKER_RE
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
}

pub fn is_meta(raw: &str) -> bool {
    META_RE.is_match(raw)
}

/// Group number of a `[* Gn]` marker, when the line sits shallow enough
pub fn group_marker(line: &Line) -> Option<u8> {
    if line.depth() > GROUP_MAX_DEPTH {
        return None;
    }
    GROUP_RE
        .captures(line.raw())
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
