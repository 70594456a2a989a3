//! crates/comment_lottery_core/src/session.rs
//!
//! One user's lottery: the request lifecycle, the spin coordinator that feeds
//! off it, and the selection engine they share.

use rand::rngs::StdRng;

use crate::domain::{CommentPool, Winner};
use crate::error::{FetchError, SpinError};
use crate::lifecycle::{Completion, Generation, RequestLifecycle, RequestState, Submission};
use crate::ports::RandomSource;
use crate::repository::CommentRepository;
use crate::selection::SelectionEngine;
use crate::spin::{LotteryState, SpinCoordinator, SpinOutcome};

pub struct LotterySession<S = StdRng> {
    lifecycle: RequestLifecycle,
    coordinator: SpinCoordinator,
    engine: SelectionEngine<S>,
}

impl LotterySession<StdRng> {
    pub fn new() -> Self {
        Self::with_engine(SelectionEngine::from_entropy())
    }
}

impl Default for LotterySession<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: RandomSource> LotterySession<S> {
    pub fn with_engine(engine: SelectionEngine<S>) -> Self {
        Self {
            lifecycle: RequestLifecycle::new(),
            coordinator: SpinCoordinator::new(),
            engine,
        }
    }

    pub fn request_state(&self) -> &RequestState {
        self.lifecycle.state()
    }

    pub fn lottery_state(&self) -> &LotteryState {
        self.coordinator.state()
    }

    pub fn pool(&self) -> Option<&CommentPool> {
        self.lifecycle.pool()
    }

    /// Starts a new request. A started request discards the previous pool
    /// and any winner drawn from it.
    pub fn submit(&mut self, raw_link: &str) -> Submission {
        let submission = self.lifecycle.submit(raw_link);
        if matches!(submission, Submission::Fetch(_) | Submission::Failed(_)) {
            self.coordinator.clear();
        }
        submission
    }

    /// Feeds back the result of the fetch issued for `generation`.
    pub fn complete(
        &mut self,
        generation: Generation,
        result: Result<CommentPool, FetchError>,
    ) -> Completion {
        let completion = self.lifecycle.complete(generation, result);
        if completion == Completion::Applied {
            if let Some(pool) = self.lifecycle.pool() {
                self.coordinator.load(pool.clone());
            }
        }
        completion
    }

    /// Submits `raw_link` and, if it starts a fetch, performs it right away.
    pub async fn submit_and_fetch(
        &mut self,
        repository: &CommentRepository,
        raw_link: &str,
    ) -> Submission {
        let submission = self.submit(raw_link);
        if let Submission::Fetch(ticket) = &submission {
            let result = repository.fetch(&ticket.video_id).await;
            self.complete(ticket.generation, result);
        }
        submission
    }

    pub fn reset(&mut self) {
        self.lifecycle.reset();
        self.coordinator.clear();
    }

    pub fn spin(&mut self) -> Result<SpinOutcome, SpinError> {
        self.coordinator.spin(&mut self.engine)
    }

    pub fn animation_complete(&mut self) -> Result<Winner, SpinError> {
        self.coordinator.on_animation_complete()
    }

    pub fn dismiss_winner(&mut self) -> Result<(), SpinError> {
        self.coordinator.dismiss()
    }
}
