//! crates/comment_lottery_core/src/spin.rs
//!
//! Gates spins of the wheel and resolves the winner once the animation lands.

use chrono::Utc;
use tracing::{error, info};

use crate::domain::{CommentPool, WheelSegment, Winner};
use crate::error::SpinError;
use crate::ports::RandomSource;
use crate::selection::SelectionEngine;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LotteryState {
    /// No pool, or an empty one.
    NotReady,
    Armed,
    Spinning { target_index: usize },
    Settled(Winner),
}

impl LotteryState {
    pub fn name(&self) -> &'static str {
        match self {
            LotteryState::NotReady => "not_ready",
            LotteryState::Armed => "armed",
            LotteryState::Spinning { .. } => "spinning",
            LotteryState::Settled(_) => "settled",
        }
    }
}

/// What the animation needs to land on the chosen segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpinStart {
    pub segments: Vec<WheelSegment>,
    pub target_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpinOutcome {
    Started(SpinStart),
    /// A spin is already in flight; its target stays put.
    Ignored,
}

#[derive(Debug)]
pub struct SpinCoordinator {
    pool: Option<CommentPool>,
    state: LotteryState,
}

impl Default for SpinCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl SpinCoordinator {
    pub fn new() -> Self {
        Self {
            pool: None,
            state: LotteryState::NotReady,
        }
    }

    pub fn state(&self) -> &LotteryState {
        &self.state
    }

    pub fn winner(&self) -> Option<&Winner> {
        match &self.state {
            LotteryState::Settled(winner) => Some(winner),
            _ => None,
        }
    }

    pub fn can_spin(&self) -> bool {
        self.state == LotteryState::Armed
    }

    /// Installs a freshly fetched pool, discarding any previous spin or winner.
    pub fn load(&mut self, pool: CommentPool) {
        self.state = if pool.is_empty() {
            LotteryState::NotReady
        } else {
            LotteryState::Armed
        };
        self.pool = Some(pool);
    }

    /// Forgets the pool; used when a new request starts.
    pub fn clear(&mut self) {
        self.pool = None;
        self.state = LotteryState::NotReady;
    }

    pub fn spin<S: RandomSource>(
        &mut self,
        engine: &mut SelectionEngine<S>,
    ) -> Result<SpinOutcome, SpinError> {
        match self.state {
            LotteryState::Armed => {}
            LotteryState::Spinning { .. } => return Ok(SpinOutcome::Ignored),
            ref other => {
                error!(state = other.name(), "Spin requested outside the armed state.");
                return Err(SpinError::NotArmed(other.name()));
            }
        }

        let pool = self.pool.as_ref().ok_or_else(|| {
            error!("Armed without a pool.");
            SpinError::EmptyPool
        })?;
        let target_index = engine.select(pool)?;
        info!(target_index, participants = pool.len(), "Spin started.");

        let start = SpinStart {
            segments: pool.segments(),
            target_index,
        };
        self.state = LotteryState::Spinning { target_index };
        Ok(SpinOutcome::Started(start))
    }

    /// Resolves the winner fixed at spin start.
    pub fn on_animation_complete(&mut self) -> Result<Winner, SpinError> {
        let LotteryState::Spinning { target_index } = self.state else {
            error!(state = self.state.name(), "Animation completed with no spin in flight.");
            return Err(SpinError::NotSpinning);
        };
        let entry = self
            .pool
            .as_ref()
            .and_then(|pool| pool.get(target_index))
            .cloned()
            .ok_or_else(|| {
                error!(target_index, "Spin target is outside the loaded pool.");
                SpinError::EmptyPool
            })?;

        let winner = Winner {
            entry,
            target_index,
            drawn_at: Utc::now(),
        };
        info!(target_index, author = %winner.entry.author, "Winner drawn.");
        self.state = LotteryState::Settled(winner.clone());
        Ok(winner)
    }

    /// Closes the winner display so the same pool can be drawn again.
    pub fn dismiss(&mut self) -> Result<(), SpinError> {
        if !matches!(self.state, LotteryState::Settled(_)) {
            error!(state = self.state.name(), "Winner dismissed with none drawn.");
            return Err(SpinError::NotSettled);
        }
        self.state = LotteryState::Armed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CommentEntry;

    /// Always draws the same index.
    struct Fixed(usize);

    impl RandomSource for Fixed {
        fn index_below(&mut self, upper: usize) -> usize {
            self.0 % upper
        }
    }

    fn pool(authors: &[&str]) -> CommentPool {
        CommentPool::new(
            authors
                .iter()
                .map(|a| CommentEntry {
                    author: a.to_string(),
                    text: format!("{a} says hi"),
                    avatar_url: None,
                })
                .collect(),
        )
    }

    #[test]
    fn spin_fixes_target_and_settles_on_it() {
        let mut coordinator = SpinCoordinator::new();
        coordinator.load(pool(&["A", "B", "C"]));
        assert!(coordinator.can_spin());

        let mut engine = SelectionEngine::new(Fixed(2));
        let SpinOutcome::Started(start) = coordinator.spin(&mut engine).unwrap() else {
            panic!("spin should start");
        };
        assert_eq!(start.target_index, 2);
        assert_eq!(start.segments.len(), 3);
        assert_eq!(coordinator.state(), &LotteryState::Spinning { target_index: 2 });

        let winner = coordinator.on_animation_complete().unwrap();
        assert_eq!(winner.entry.author, "C");
        assert_eq!(winner.target_index, 2);
        assert_eq!(coordinator.winner(), Some(&winner));
    }

    #[test]
    fn second_spin_while_spinning_keeps_target() {
        let mut coordinator = SpinCoordinator::new();
        coordinator.load(pool(&["A", "B", "C"]));
        coordinator.spin(&mut SelectionEngine::new(Fixed(0))).unwrap();

        assert_eq!(
            coordinator.spin(&mut SelectionEngine::new(Fixed(1))),
            Ok(SpinOutcome::Ignored)
        );
        assert_eq!(coordinator.on_animation_complete().unwrap().entry.author, "A");
    }

    #[test]
    fn wrong_state_transitions_fail_loudly() {
        let mut coordinator = SpinCoordinator::new();
        let mut engine = SelectionEngine::new(Fixed(0));
        assert_eq!(
            coordinator.spin(&mut engine),
            Err(SpinError::NotArmed("not_ready"))
        );
        assert_eq!(coordinator.on_animation_complete(), Err(SpinError::NotSpinning));
        assert_eq!(coordinator.dismiss(), Err(SpinError::NotSettled));

        coordinator.load(pool(&["A"]));
        coordinator.spin(&mut engine).unwrap();
        coordinator.on_animation_complete().unwrap();
        assert_eq!(coordinator.spin(&mut engine), Err(SpinError::NotArmed("settled")));
        assert_eq!(coordinator.on_animation_complete(), Err(SpinError::NotSpinning));
    }

    #[test]
    fn dismiss_outside_settled_keeps_state() {
        let mut coordinator = SpinCoordinator::new();
        let mut engine = SelectionEngine::new(Fixed(0));

        coordinator.load(pool(&["A", "B"]));
        assert_eq!(coordinator.dismiss(), Err(SpinError::NotSettled));
        assert_eq!(coordinator.state(), &LotteryState::Armed);

        coordinator.spin(&mut engine).unwrap();
        assert_eq!(coordinator.dismiss(), Err(SpinError::NotSettled));
        assert_eq!(
            coordinator.state(),
            &LotteryState::Spinning { target_index: 0 }
        );
    }

    #[test]
    fn empty_pool_never_arms() {
        let mut coordinator = SpinCoordinator::new();
        coordinator.load(pool(&[]));
        assert_eq!(coordinator.state(), &LotteryState::NotReady);
        assert!(!coordinator.can_spin());
    }

    #[test]
    fn dismiss_rearms_the_same_pool() {
        let mut coordinator = SpinCoordinator::new();
        coordinator.load(pool(&["A", "B"]));
        let mut engine = SelectionEngine::new(Fixed(1));
        coordinator.spin(&mut engine).unwrap();
        coordinator.on_animation_complete().unwrap();

        coordinator.dismiss().unwrap();
        assert_eq!(coordinator.state(), &LotteryState::Armed);
        assert!(coordinator.winner().is_none());
        assert!(matches!(coordinator.spin(&mut engine), Ok(SpinOutcome::Started(_))));
    }

    #[test]
    fn settled_winner_survives_pool_replacement() {
        let mut coordinator = SpinCoordinator::new();
        coordinator.load(pool(&["A", "B"]));
        coordinator.spin(&mut SelectionEngine::new(Fixed(1))).unwrap();
        let winner = coordinator.on_animation_complete().unwrap();

        coordinator.load(pool(&["X", "Y", "Z"]));
        assert_eq!(coordinator.state(), &LotteryState::Armed);
        assert!(coordinator.winner().is_none());
        assert_eq!(winner.entry.author, "B");
        assert_eq!(winner.entry.text, "B says hi");
    }
}
