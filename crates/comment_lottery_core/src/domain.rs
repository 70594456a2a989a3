//! crates/comment_lottery_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any transport or serialization format.

use chrono::{DateTime, Utc};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::link::ParseError;

/// Number of background colours the wheel cycles through.
pub const WHEEL_PALETTE_SIZE: usize = 5;

/// An 11-character video identifier drawn from `[A-Za-z0-9_-]`.
///
/// The only ways to obtain one are [`VideoId::new`] and the link parser, so a
/// value of this type always satisfies the identifier grammar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    pub const LEN: usize = 11;

    pub fn new(raw: &str) -> Result<Self, ParseError> {
        let valid = raw.len() == Self::LEN
            && raw
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(ParseError::MalformedLink)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One distinct commenter's first-seen comment on the video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentEntry {
    pub author: String,
    pub text: String,
    pub avatar_url: Option<String>,
}

/// The deduplicated, ordered set of commenter entries for one fetch.
///
/// Immutable once built; clones share the same backing storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentPool {
    entries: Arc<[CommentEntry]>,
}

impl CommentPool {
    pub fn new(entries: Vec<CommentEntry>) -> Self {
        Self {
            entries: entries.into(),
        }
    }

    pub fn entries(&self) -> &[CommentEntry] {
        &self.entries
    }

    /// The wheel segments for this pool, in pool order.
    pub fn segments(&self) -> Vec<WheelSegment> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| WheelSegment {
                label: entry.author.clone(),
                color_index: index % WHEEL_PALETTE_SIZE,
            })
            .collect()
    }
}

impl Deref for CommentPool {
    type Target = [CommentEntry];

    fn deref(&self) -> &Self::Target {
        &self.entries
    }
}

/// A single slice of the wheel as handed to the animation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelSegment {
    pub label: String,
    pub color_index: usize,
}

/// The outcome of one settled spin.
///
/// An owned snapshot: replacing the pool afterwards never changes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Winner {
    pub entry: CommentEntry,
    pub target_index: usize,
    pub drawn_at: DateTime<Utc>,
}
