//! crates/comment_lottery_core/src/lifecycle.rs
//!
//! The request state machine that takes a raw link through parsing and
//! fetching.
//!
//! ```text
//! Idle ──submit──▶ Validating ──parse ok──▶ Loading ──fetch ok──▶ Ready
//!                      │                       │
//!                      └──parse fail──▶ Error ◀┴──fetch fail
//! ```
//!
//! `Ready` and `Error` accept a new submit. Every fetch is tagged with a
//! generation; only the response for the outstanding generation is applied.

use tracing::{debug, info, warn};

use crate::domain::{CommentPool, VideoId};
use crate::error::{FetchError, LotteryError};
use crate::link::{self, ParseError};

/// Monotonically increasing marker of an issued fetch.
pub type Generation = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestState {
    Idle,
    Validating,
    Loading { generation: Generation },
    Ready(CommentPool),
    Error(LotteryError),
}

impl RequestState {
    pub fn name(&self) -> &'static str {
        match self {
            RequestState::Idle => "idle",
            RequestState::Validating => "validating",
            RequestState::Loading { .. } => "loading",
            RequestState::Ready(_) => "ready",
            RequestState::Error(_) => "error",
        }
    }
}

/// The single fetch a caller must perform after a successful submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: Generation,
    pub video_id: VideoId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// The link failed the live format check; nothing changed.
    Rejected(ParseError),
    /// A fetch is outstanding; the submit was dropped.
    Ignored,
    /// The link looked right but no identifier could be extracted.
    Failed(ParseError),
    /// Now loading; the caller issues exactly one fetch for this ticket.
    Fetch(FetchTicket),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// The response belonged to an abandoned generation.
    Stale,
}

#[derive(Debug)]
pub struct RequestLifecycle {
    state: RequestState,
    generation: Generation,
}

impl Default for RequestLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestLifecycle {
    pub fn new() -> Self {
        Self {
            state: RequestState::Idle,
            generation: 0,
        }
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, RequestState::Loading { .. })
    }

    /// The pool, once the last fetch succeeded.
    pub fn pool(&self) -> Option<&CommentPool> {
        match &self.state {
            RequestState::Ready(pool) => Some(pool),
            _ => None,
        }
    }

    pub fn submit(&mut self, raw_link: &str) -> Submission {
        if self.is_loading() {
            debug!("Submit ignored while a fetch is outstanding.");
            return Submission::Ignored;
        }
        if !link::is_plausible_link(raw_link) {
            debug!("Submit rejected by the live link check.");
            return Submission::Rejected(ParseError::MalformedLink);
        }

        self.state = RequestState::Validating;
        match link::parse(raw_link) {
            Ok(video_id) => {
                self.generation += 1;
                let generation = self.generation;
                info!(%video_id, generation, "Link accepted, loading comments.");
                self.state = RequestState::Loading { generation };
                Submission::Fetch(FetchTicket {
                    generation,
                    video_id,
                })
            }
            Err(e) => {
                warn!("Link passed the live check but no video id could be extracted.");
                self.state = RequestState::Error(e.into());
                Submission::Failed(e)
            }
        }
    }

    /// Applies the result of the fetch issued for `generation`.
    pub fn complete(
        &mut self,
        generation: Generation,
        result: Result<CommentPool, FetchError>,
    ) -> Completion {
        match self.state {
            RequestState::Loading { generation: current } if current == generation => {}
            _ => {
                warn!(generation, outstanding = self.generation, "Discarding stale fetch response.");
                return Completion::Stale;
            }
        }

        self.state = match result {
            Ok(pool) => {
                info!(generation, participants = pool.len(), "Comments ready.");
                RequestState::Ready(pool)
            }
            Err(e) => {
                warn!(generation, error = %e, "Comment fetch failed.");
                RequestState::Error(e.into())
            }
        };
        Completion::Applied
    }

    /// Returns to `Idle`. An outstanding fetch is abandoned, not cancelled: its
    /// response will arrive later and be discarded as stale.
    pub fn reset(&mut self) {
        self.state = RequestState::Idle;
    }
}
