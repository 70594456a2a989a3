//! crates/comment_lottery_core/src/selection.rs
//!
//! Draws the winning index from a pool.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::error;

use crate::domain::CommentEntry;
use crate::error::SpinError;
use crate::ports::RandomSource;

pub struct SelectionEngine<S = StdRng> {
    source: S,
}

impl SelectionEngine<StdRng> {
    /// An engine backed by an OS-seeded RNG.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// A reproducible engine, for tests and replays.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<S: RandomSource> SelectionEngine<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Returns an index drawn uniformly from `0..pool.len()`.
    pub fn select(&mut self, pool: &[CommentEntry]) -> Result<usize, SpinError> {
        if pool.is_empty() {
            error!("Selection requested from an empty pool.");
            return Err(SpinError::EmptyPool);
        }
        let index = self.source.index_below(pool.len());
        debug_assert!(index < pool.len());
        Ok(index)
    }
}
