//! services/api/src/web/fetch_task.rs
//!
//! This module contains the asynchronous "worker" function that performs the
//! single comment fetch issued for a submitted link.

use crate::web::state::AppState;
use comment_lottery_core::{CommentPool, FetchError, FetchTicket, Generation};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

/// The result of one fetch, reported back to the connection's control loop.
#[derive(Debug)]
pub struct FetchCompleted {
    pub generation: Generation,
    pub result: Result<CommentPool, FetchError>,
}

/// Runs the fetch for `ticket` and reports the outcome on `results`.
///
/// The fetch always runs to completion; whether its result still matters is
/// decided by the control loop when the report arrives.
pub async fn fetch_process(
    app_state: Arc<AppState>,
    ticket: FetchTicket,
    results: UnboundedSender<FetchCompleted>,
) {
    let delay = app_state.config.fetch_delay;
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let start = Instant::now();
    let result = app_state.comments.fetch(&ticket.video_id).await;
    info!(
        video_id = %ticket.video_id,
        generation = ticket.generation,
        ok = result.is_ok(),
        "⏱️ Comment fetch took {:?}",
        start.elapsed()
    );

    let report = FetchCompleted {
        generation: ticket.generation,
        result,
    };
    if results.send(report).is_err() {
        warn!("Connection closed before the fetch completed.");
    }
}
