use crate::game::action::Action;
use crate::game::error::{EngineError, InvariantViolation};
use crate::game::phase::{GamePhase, TerminationReason};
use crate::game::state::GameState;
use crate::model::card::Card;
use crate::model::player::PlayerId;
use serde::{Deserialize, Serialize};
use tracing::{Level, event};

/// What happened to the card (or token) an action touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Resolution {
    Played { card: Card, hint_restored: bool },
    Misplayed { card: Card, strikes: u8 },
    Discarded { card: Card, hint_restored: bool },
    Hinted { hints_left: u8 },
}

impl Resolution {
    pub const fn card(&self) -> Option<Card> {
        match *self {
            Resolution::Played { card, .. }
            | Resolution::Misplayed { card, .. }
            | Resolution::Discarded { card, .. } => Some(card),
            Resolution::Hinted { .. } => None,
        }
    }
}

/// One resolved turn, with the token counts and phase left behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub turn: u32,
    pub player: PlayerId,
    pub action: Action,
    pub resolution: Resolution,
    pub drawn: Option<Card>,
    pub hints: u8,
    pub strikes: u8,
    pub phase: GamePhase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub score: u32,
    pub won: bool,
    pub reason: TerminationReason,
    pub turns: u32,
    pub strikes: u8,
    pub hint_tokens: u8,
    pub plays: u32,
    pub misplays: u32,
    pub discards: u32,
    pub hints: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ActionTally {
    plays: u32,
    misplays: u32,
    discards: u32,
    hints: u32,
}

/// Applies actions to a [`GameState`] one turn at a time and decides when the
/// game ends.
#[derive(Debug, Clone)]
pub struct TurnEngine {
    state: GameState,
    record: Option<Vec<TurnRecord>>,
    tally: ActionTally,
}

impl TurnEngine {
    pub fn new(state: GameState) -> Self {
        Self {
            state,
            record: None,
            tally: ActionTally::default(),
        }
    }

    /// Keeps every [`TurnRecord`] produced by [`TurnEngine::step`].
    pub fn with_recording(mut self) -> Self {
        self.record = Some(Vec::new());
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase()
    }

    pub fn turns(&self) -> &[TurnRecord] {
        self.record.as_deref().unwrap_or(&[])
    }

    pub fn into_turns(self) -> Vec<TurnRecord> {
        self.record.unwrap_or_default()
    }

    /// Resolves `action` for the current player.
    pub fn step(&mut self, action: Action) -> Result<TurnRecord, EngineError> {
        if self.state.phase().is_terminated() {
            return Err(InvariantViolation::ActionAfterTermination.into());
        }
        let player = self.state.current_player();
        let hand_size = self.state.hand(player).len();
        if hand_size == 0 {
            return Err(InvariantViolation::EmptyHand { player }.into());
        }
        let counting_down = match self.state.phase() {
            GamePhase::FinalRound { turns_remaining } => Some(turns_remaining),
            _ => None,
        };

        let resolution = self.apply(player, action, hand_size)?;

        let drawn = match action {
            Action::Hint => None,
            Action::Play(_) | Action::Discard(_) => {
                let card = self.state.deck_mut().draw();
                if let Some(card) = card {
                    self.state.hand_mut(player).add(card);
                }
                card
            }
        };
        let deck_exhausted_now = drawn.is_some() && self.state.deck().is_empty();

        let phase = self.next_phase(counting_down, deck_exhausted_now);
        self.state.set_phase(phase);
        self.state.check_conservation()?;
        self.state.finish_turn();

        let tokens = *self.state.tokens();
        let record = TurnRecord {
            turn: self.state.turns_taken(),
            player,
            action,
            resolution,
            drawn,
            hints: tokens.hints(),
            strikes: tokens.strikes(),
            phase,
        };
        log_turn(&record, self.state.score(), self.state.deck().len());
        if deck_exhausted_now && !phase.is_terminated() {
            event!(
                target: "hanabi_core::engine",
                Level::INFO,
                turn = record.turn,
                turns_remaining = self.state.player_count(),
                "deck exhausted; final round started"
            );
        }
        if let Some(reason) = phase.termination() {
            event!(
                target: "hanabi_core::engine",
                Level::INFO,
                turn = record.turn,
                score = self.state.score(),
                strikes = tokens.strikes(),
                reason = %reason,
                "game terminated"
            );
        }
        if let Some(turns) = self.record.as_mut() {
            turns.push(record);
        }
        Ok(record)
    }

    /// Drives the game to termination, asking `decide` for each action.
    ///
    /// An empty hand is reported before `decide` is consulted.
    pub fn run<F>(&mut self, mut decide: F) -> Result<GameResult, EngineError>
    where
        F: FnMut(&GameState, PlayerId) -> Action,
    {
        loop {
            if let Some(reason) = self.state.phase().termination() {
                return Ok(self.summarize(reason));
            }
            let player = self.state.current_player();
            if self.state.hand(player).is_empty() {
                return Err(InvariantViolation::EmptyHand { player }.into());
            }
            let action = decide(&self.state, player);
            self.step(action)?;
        }
    }

    /// Final tallies, once the game has terminated.
    pub fn result(&self) -> Option<GameResult> {
        self.state
            .phase()
            .termination()
            .map(|reason| self.summarize(reason))
    }

    fn apply(
        &mut self,
        player: PlayerId,
        action: Action,
        hand_size: usize,
    ) -> Result<Resolution, InvariantViolation> {
        let invalid_slot = |slot| InvariantViolation::InvalidSlot {
            player,
            slot,
            hand_size,
        };
        match action {
            Action::Play(slot) => {
                let card = self
                    .state
                    .hand_mut(player)
                    .take(slot)
                    .ok_or_else(|| invalid_slot(slot))?;
                if self.state.stacks_mut().place(card) {
                    self.tally.plays += 1;
                    let hint_restored = card.is_five()
                        && self.state.config().refill_hint_on_five
                        && self.state.tokens_mut().restore_hint();
                    Ok(Resolution::Played {
                        card,
                        hint_restored,
                    })
                } else {
                    self.tally.misplays += 1;
                    self.state.tokens_mut().add_strike();
                    self.state.discards_mut().push(card);
                    Ok(Resolution::Misplayed {
                        card,
                        strikes: self.state.tokens().strikes(),
                    })
                }
            }
            Action::Discard(slot) => {
                let card = self
                    .state
                    .hand_mut(player)
                    .take(slot)
                    .ok_or_else(|| invalid_slot(slot))?;
                self.tally.discards += 1;
                self.state.discards_mut().push(card);
                let hint_restored = self.state.tokens_mut().restore_hint();
                Ok(Resolution::Discarded {
                    card,
                    hint_restored,
                })
            }
            Action::Hint => {
                if !self.state.tokens_mut().spend_hint() {
                    return Err(InvariantViolation::NoHintTokens { player });
                }
                self.tally.hints += 1;
                Ok(Resolution::Hinted {
                    hints_left: self.state.tokens().hints(),
                })
            }
        }
    }

    /// Strike-out beats a completed board, which beats the countdown.
    fn next_phase(&self, counting_down: Option<u8>, deck_exhausted_now: bool) -> GamePhase {
        if self.state.tokens().strikes_exhausted() {
            return GamePhase::Terminated(TerminationReason::StrikesExhausted);
        }
        if self.state.stacks().all_complete() {
            return GamePhase::Terminated(TerminationReason::StacksComplete);
        }
        match counting_down {
            Some(remaining) if remaining <= 1 => {
                GamePhase::Terminated(TerminationReason::FinalRoundElapsed)
            }
            Some(remaining) => GamePhase::FinalRound {
                turns_remaining: remaining - 1,
            },
            None if deck_exhausted_now => GamePhase::FinalRound {
                turns_remaining: self.state.player_count(),
            },
            None => GamePhase::InProgress,
        }
    }

    fn summarize(&self, reason: TerminationReason) -> GameResult {
        let tokens = self.state.tokens();
        GameResult {
            score: self.state.score(),
            won: self.state.is_won(),
            reason,
            turns: self.state.turns_taken(),
            strikes: tokens.strikes(),
            hint_tokens: tokens.hints(),
            plays: self.tally.plays,
            misplays: self.tally.misplays,
            discards: self.tally.discards,
            hints: self.tally.hints,
        }
    }
}

fn log_turn(record: &TurnRecord, score: u32, deck_len: usize) {
    if !tracing::enabled!(target: "hanabi_core::turn", Level::DEBUG) {
        return;
    }
    let card = record
        .resolution
        .card()
        .map(|card| card.to_string())
        .unwrap_or_default();
    let drawn = record.drawn.map(|card| card.to_string()).unwrap_or_default();
    event!(
        target: "hanabi_core::turn",
        Level::DEBUG,
        turn = record.turn,
        player = %record.player,
        action = record.action.kind(),
        card = %card,
        drawn = %drawn,
        hints = record.hints,
        strikes = record.strikes,
        score,
        deck = deck_len,
    );
}
