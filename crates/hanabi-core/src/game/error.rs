use crate::game::config::ConfigError;
use crate::model::player::PlayerId;
use thiserror::Error;

/// A broken state-machine invariant. Always fatal for the game in progress.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("{player} was asked to act with an empty hand")]
    EmptyHand { player: PlayerId },
    #[error("{player} chose slot {slot} but holds {hand_size} cards")]
    InvalidSlot {
        player: PlayerId,
        slot: usize,
        hand_size: usize,
    },
    #[error("{player} gave a hint with no hint tokens left")]
    NoHintTokens { player: PlayerId },
    #[error("card count mismatch: expected {expected}, found {found}")]
    CardCountMismatch { expected: usize, found: usize },
    #[error("expected {expected} hands, found {found}")]
    SeatCount { expected: usize, found: usize },
    #[error("action submitted after the game terminated")]
    ActionAfterTermination,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("invalid game configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),
}
