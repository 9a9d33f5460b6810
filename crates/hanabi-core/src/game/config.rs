use crate::model::card::TOTAL_CARDS;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_PLAYERS: u8 = 2;
pub const MAX_PLAYERS: u8 = 5;
pub const DEFAULT_MAX_HINT_TOKENS: u8 = 8;
pub const DEFAULT_MAX_STRIKES: u8 = 3;

/// Table rules for a single game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub player_count: u8,
    pub max_hint_tokens: u8,
    pub max_strikes: u8,
    pub hand_size: u8,
    /// Completing a color (playing a 5) restores one hint token.
    pub refill_hint_on_five: bool,
}

impl GameConfig {
    /// Standard rules for `player_count` players. Not validated until a game is dealt.
    pub const fn for_players(player_count: u8) -> Self {
        Self {
            player_count,
            max_hint_tokens: DEFAULT_MAX_HINT_TOKENS,
            max_strikes: DEFAULT_MAX_STRIKES,
            hand_size: default_hand_size(player_count),
            refill_hint_on_five: true,
        }
    }

    pub const fn with_hand_size(mut self, hand_size: u8) -> Self {
        self.hand_size = hand_size;
        self
    }

    pub const fn with_max_hint_tokens(mut self, max_hint_tokens: u8) -> Self {
        self.max_hint_tokens = max_hint_tokens;
        self
    }

    pub const fn with_max_strikes(mut self, max_strikes: u8) -> Self {
        self.max_strikes = max_strikes;
        self
    }

    pub const fn with_refill_hint_on_five(mut self, enabled: bool) -> Self {
        self.refill_hint_on_five = enabled;
        self
    }

    /// Cards left in the deck right after the deal.
    pub const fn initial_deck_len(&self) -> usize {
        TOTAL_CARDS.saturating_sub(self.player_count as usize * self.hand_size as usize)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.player_count) {
            return Err(ConfigError::PlayerCount {
                found: self.player_count,
            });
        }
        if self.max_hint_tokens == 0 {
            return Err(ConfigError::HintTokens);
        }
        if self.max_strikes == 0 {
            return Err(ConfigError::Strikes);
        }
        if self.hand_size == 0 {
            return Err(ConfigError::HandSize);
        }
        let dealt = self.player_count as usize * self.hand_size as usize;
        if dealt >= TOTAL_CARDS {
            return Err(ConfigError::DeckTooSmall {
                dealt,
                available: TOTAL_CARDS,
            });
        }
        Ok(())
    }
}

/// Five cards each for two or three players, four for larger tables.
pub const fn default_hand_size(player_count: u8) -> u8 {
    if player_count >= 4 { 4 } else { 5 }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("player count must be between 2 and 5, got {found}")]
    PlayerCount { found: u8 },
    #[error("max_hint_tokens must be greater than zero")]
    HintTokens,
    #[error("max_strikes must be greater than zero")]
    Strikes,
    #[error("hand_size must be greater than zero")]
    HandSize,
    #[error("dealing {dealt} cards would leave nothing in a {available}-card deck")]
    DeckTooSmall { dealt: usize, available: usize },
}
