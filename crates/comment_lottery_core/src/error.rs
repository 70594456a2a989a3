//! crates/comment_lottery_core/src/error.rs
//!
//! Error kinds surfaced by the comment collection and selection engine.

use crate::link::ParseError;
use crate::ports::PortError;

/// Failure of a single comment fetch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The source was reachable but returned no usable comment items.
    #[error("No comments found for this video")]
    NoComments,
    /// Network, timeout, or unparsable response. Retryable by resubmitting.
    #[error("Failed to fetch comments: {0}")]
    Transport(String),
}

impl From<PortError> for FetchError {
    fn from(e: PortError) -> Self {
        FetchError::Transport(e.to_string())
    }
}

/// The error kind carried by the request lifecycle's `Error` state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LotteryError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl LotteryError {
    /// A stable, machine-readable name for the kind.
    pub fn kind(&self) -> &'static str {
        match self {
            LotteryError::Parse(ParseError::MalformedLink) => "malformed_link",
            LotteryError::Fetch(FetchError::NoComments) => "no_comments",
            LotteryError::Fetch(FetchError::Transport(_)) => "transport",
        }
    }
}

/// Invariant violations of the lottery state machine.
///
/// These are programming errors: the state guards make them unreachable from a
/// well-behaved client, but they are reported rather than ignored when hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SpinError {
    #[error("Cannot select from an empty pool")]
    EmptyPool,
    #[error("Cannot spin while the lottery is {0}")]
    NotArmed(&'static str),
    #[error("No spin is in progress")]
    NotSpinning,
    #[error("No winner to dismiss")]
    NotSettled,
}
