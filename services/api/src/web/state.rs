//! services/api/src/web/state.rs
//!
//! Defines the application state shared by every connection.
//!
//! Per-connection lottery state is not kept here: each WebSocket owns its own
//! `LotterySession` inside its control loop.

use crate::config::Config;
use comment_lottery_core::CommentRepository;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub comments: CommentRepository,
}
