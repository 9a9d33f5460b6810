pub mod action;
pub mod config;
pub mod engine;
pub mod error;
pub mod phase;
pub mod record;
pub mod state;
pub mod view;

pub use action::Action;
pub use config::{ConfigError, GameConfig};
pub use engine::{GameResult, Resolution, TurnEngine, TurnRecord};
pub use error::{EngineError, InvariantViolation};
pub use phase::{GamePhase, TerminationReason};
pub use record::{GameRecord, ReplayError};
pub use state::GameState;
pub use view::{OmniscientView, TableView};
