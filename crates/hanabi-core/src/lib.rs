#![deny(warnings)]
pub mod game;
pub mod model;
pub mod rules;

pub use game::{
    Action, ConfigError, EngineError, GameConfig, GamePhase, GameRecord, GameResult, GameState,
    InvariantViolation, OmniscientView, Resolution, TableView, TerminationReason, TurnEngine,
    TurnRecord,
};
pub use model::card::Card;
pub use model::color::Color;
pub use model::deck::Deck;
pub use model::player::PlayerId;

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "hanabi-sim"
    }

    pub const fn codename() -> &'static str {
        "Omniscient"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

#[cfg(test)]
mod tests {
    use super::AppInfo;

    #[test]
    fn exposes_static_metadata() {
        assert_eq!(AppInfo::name(), "hanabi-sim");
        assert_eq!(AppInfo::codename(), "Omniscient");
        assert!(!AppInfo::version().is_empty());
    }
}
