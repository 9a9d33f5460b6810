use crate::game::config::GameConfig;
use crate::game::engine::{GameResult, TurnEngine, TurnRecord};
use crate::game::error::EngineError;
use crate::game::state::GameState;
use crate::model::card::{Card, TOTAL_CARDS};
use crate::model::deck::{Deck, DeckError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A finished game: opening deal, every turn, and the final tallies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameRecord {
    pub seed: u64,
    pub config: GameConfig,
    pub opening_hands: Vec<Vec<Card>>,
    pub turns: Vec<TurnRecord>,
    pub result: GameResult,
}

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("recorded cards do not fit in a standard deck: {0}")]
    Deck(#[from] DeckError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("turn {turn} resolved differently on replay")]
    Diverged { turn: u32 },
    #[error("record ends after {turns} turns without a terminal phase")]
    Incomplete { turns: usize },
}

impl GameRecord {
    /// Returns `None` until `engine` has reached a terminal phase.
    pub fn capture(seed: u64, opening: &GameState, engine: &TurnEngine) -> Option<Self> {
        let result = engine.result()?;
        Some(Self {
            seed,
            config: *opening.config(),
            opening_hands: opening
                .hands()
                .iter()
                .map(|hand| hand.cards().to_vec())
                .collect(),
            turns: engine.turns().to_vec(),
            result,
        })
    }

    /// Rebuilds the deck from the deal and the recorded draws, then replays
    /// every action and checks each turn resolves as recorded.
    pub fn replay(&self) -> Result<GameResult, ReplayError> {
        let deck = Deck::arranged(&self.dealt_order())?;
        let mut engine = TurnEngine::new(GameState::deal(self.config, deck)?);
        for recorded in &self.turns {
            let replayed = engine.step(recorded.action)?;
            if replayed != *recorded {
                return Err(ReplayError::Diverged {
                    turn: recorded.turn,
                });
            }
        }
        engine.result().ok_or(ReplayError::Incomplete {
            turns: self.turns.len(),
        })
    }

    /// Cards in the order they left the deck.
    fn dealt_order(&self) -> Vec<Card> {
        let mut order = Vec::with_capacity(TOTAL_CARDS);
        for slot in 0..self.config.hand_size as usize {
            order.extend(self.opening_hands.iter().filter_map(|hand| hand.get(slot)));
        }
        order.extend(self.turns.iter().filter_map(|turn| turn.drawn));
        order
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::{GameRecord, ReplayError};
    use crate::game::action::Action;
    use crate::game::config::GameConfig;
    use crate::game::engine::TurnEngine;
    use crate::game::state::GameState;
    use crate::model::deck::Deck;

    fn finished_record(seed: u64) -> GameRecord {
        let opening =
            GameState::deal(GameConfig::for_players(3), Deck::shuffled_with_seed(seed)).unwrap();
        let mut engine = TurnEngine::new(opening.clone()).with_recording();
        let mut turn = 0u32;
        engine
            .run(|state, _| {
                turn += 1;
                if turn % 3 == 0 && state.tokens().hints() > 0 {
                    Action::Hint
                } else if turn % 2 == 0 {
                    Action::Play(0)
                } else {
                    Action::Discard(1)
                }
            })
            .unwrap();
        GameRecord::capture(seed, &opening, &engine).unwrap()
    }

    #[test]
    fn capture_waits_for_termination() {
        let opening = GameState::deal(GameConfig::for_players(2), Deck::standard()).unwrap();
        let engine = TurnEngine::new(opening.clone()).with_recording();
        assert!(GameRecord::capture(1, &opening, &engine).is_none());
    }

    #[test]
    fn record_serializes_to_json() {
        let record = finished_record(21);
        let json = record.to_json().unwrap();
        assert!(json.contains("\"seed\": 21"));
        assert!(json.contains("\"opening_hands\""));
        assert!(json.contains("\"outcome\""));
        let parsed = GameRecord::from_json(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn replay_reproduces_the_result() {
        let record = finished_record(8);
        assert_eq!(record.replay().unwrap(), record.result);
    }

    #[test]
    fn tampered_record_diverges() {
        let mut record = finished_record(8);
        let first_play = record
            .turns
            .iter()
            .position(|turn| matches!(turn.action, Action::Play(_)))
            .unwrap();
        record.turns[first_play].strikes += 1;
        assert!(matches!(
            record.replay(),
            Err(ReplayError::Diverged { .. })
        ));
    }

    #[test]
    fn truncated_record_is_incomplete() {
        let mut record = finished_record(13);
        record.turns.truncate(5);
        assert!(matches!(
            record.replay(),
            Err(ReplayError::Incomplete { turns: 5 })
        ));
    }
}
