//! crates/comment_lottery_core/src/link.rs
//!
//! Extracts a video identifier from a free-form YouTube link.
//!
//! Two patterns are applied. The coarse one answers "does this look like a
//! YouTube video link at all" and is cheap enough to run on every keystroke.
//! The extraction one pulls the identifier out. A link must pass both.

use regex::Regex;
use std::sync::OnceLock;

use crate::domain::VideoId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Not a recognizable YouTube video link")]
    MalformedLink,
}

const PLAUSIBLE_LINK: &str = r"^(?:(?:https?:)?//)?(?:www\.|m\.)?(?:youtube\.com|youtu\.be)/(?:watch\?v=|embed/|v/|shorts/|.+[?&]v=)?[A-Za-z0-9_-]{11}(?:[?&#].*)?$";

const VIDEO_ID: &str = r"(?:youtube\.com/(?:(?:v|e(?:mbed)?|shorts)/|[^/\s]+/\S+/|.*[?&]v=)|youtu\.be/)([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)";

fn plausible_link() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PLAUSIBLE_LINK).expect("link pattern is valid"))
}

fn video_id_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(VIDEO_ID).expect("video id pattern is valid"))
}

/// Coarse structural check: a recognizable YouTube domain followed by a path
/// that ends in an 11-character identifier.
pub fn is_plausible_link(raw: &str) -> bool {
    plausible_link().is_match(raw.trim())
}

/// Parses `raw` into a [`VideoId`].
pub fn parse(raw: &str) -> Result<VideoId, ParseError> {
    let raw = raw.trim();
    if !is_plausible_link(raw) {
        return Err(ParseError::MalformedLink);
    }
    let captures = video_id_pattern()
        .captures(raw)
        .ok_or(ParseError::MalformedLink)?;
    VideoId::new(&captures[1])
}
