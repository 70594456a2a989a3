//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the browser client and the API server
//! for the comment lottery wheel.

use chrono::{DateTime, Utc};
use comment_lottery_core::{CommentEntry, FetchError, LotteryError, WheelSegment, Winner};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

/// Represents the structured text messages a client can send to the server.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Submits a video link; starts loading its comments.
    Submit { link: String },

    /// Clears the current request and returns to idle.
    Reset,

    /// Asks for one spin of the wheel.
    Spin,

    /// The wheel animation has landed on the target segment.
    AnimationComplete,

    /// The user closed the winner display.
    DismissWinner,
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once the connection is ready to accept messages.
    SessionInitialized { session_id: Uuid },

    /// The submitted text is not a YouTube video link. Nothing was fetched.
    LinkRejected { message: String },

    /// The request moved to `idle`, `validating` or `loading`.
    RequestState { state: String },

    /// Comments were loaded; `participants` distinct people commented.
    Ready {
        participants: usize,
        entries: Vec<EntryView>,
    },

    /// Comments were loaded but nobody is eligible to win.
    NoEligibleParticipants,

    /// The request failed, or an action was sent in the wrong state.
    Error { kind: String, message: String },

    /// The wheel must start spinning and land on `target_index`.
    SpinStarted {
        segments: Vec<SegmentView>,
        target_index: usize,
    },

    /// The spin settled on this commenter.
    WinnerDrawn {
        author: String,
        text: String,
        avatar_url: Option<String>,
        target_index: usize,
        drawn_at: DateTime<Utc>,
    },

    /// The winner display was closed; the wheel can be spun again.
    WinnerDismissed,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct EntryView {
    pub author: String,
    pub text: String,
    pub avatar_url: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SegmentView {
    pub label: String,
    pub color_index: usize,
}

impl From<&CommentEntry> for EntryView {
    fn from(entry: &CommentEntry) -> Self {
        Self {
            author: entry.author.clone(),
            text: entry.text.clone(),
            avatar_url: entry.avatar_url.clone(),
        }
    }
}

impl From<WheelSegment> for SegmentView {
    fn from(segment: WheelSegment) -> Self {
        Self {
            label: segment.label,
            color_index: segment.color_index,
        }
    }
}

impl From<Winner> for ServerMessage {
    fn from(winner: Winner) -> Self {
        ServerMessage::WinnerDrawn {
            author: winner.entry.author,
            text: winner.entry.text,
            avatar_url: winner.entry.avatar_url,
            target_index: winner.target_index,
            drawn_at: winner.drawn_at,
        }
    }
}

impl From<&LotteryError> for ServerMessage {
    fn from(error: &LotteryError) -> Self {
        let message = match error {
            LotteryError::Parse(_) => "Invalid YouTube link.",
            LotteryError::Fetch(FetchError::NoComments) => {
                "No comments found, or the video ID is invalid."
            }
            LotteryError::Fetch(FetchError::Transport(_)) => {
                "Something went wrong. Please try again."
            }
        };
        ServerMessage::Error {
            kind: error.kind().to_string(),
            message: message.to_string(),
        }
    }
}
