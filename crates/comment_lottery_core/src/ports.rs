//! crates/comment_lottery_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the concrete comment source and randomness provider.

use async_trait::async_trait;
use rand::{Rng, RngCore};

use crate::domain::VideoId;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., network, JSON).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Request timed out")]
    Timeout,
    #[error("Malformed response: {0}")]
    Malformed(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Comment Source
//=========================================================================================

/// A top-level comment as reported by the comment source, before any shaping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawComment {
    pub author_display_name: String,
    pub text_display: String,
    pub author_profile_image_url: Option<String>,
}

/// One page of comment threads.
///
/// `items` is `None` when the payload had no item collection at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentPage {
    pub items: Option<Vec<RawComment>>,
    pub next_page_token: Option<String>,
}

#[async_trait]
pub trait CommentSource: Send + Sync {
    /// Fetches one page of top-level comment threads with plain-text bodies.
    async fn fetch_comment_page(
        &self,
        video_id: &VideoId,
        page_token: Option<&str>,
    ) -> PortResult<CommentPage>;
}

//=========================================================================================
// Randomness
//=========================================================================================

pub trait RandomSource: Send {
    /// Returns an index drawn uniformly from `0..upper`. `upper` is never zero.
    fn index_below(&mut self, upper: usize) -> usize;
}

impl<R: RngCore + Send> RandomSource for R {
    fn index_below(&mut self, upper: usize) -> usize {
        self.gen_range(0..upper)
    }
}
