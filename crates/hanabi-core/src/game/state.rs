use crate::game::config::GameConfig;
use crate::game::error::{EngineError, InvariantViolation};
use crate::game::phase::{GamePhase, TerminationReason};
use crate::game::view::{OmniscientView, TableView};
use crate::model::card::{MAX_NUMBER, TOTAL_CARDS};
use crate::model::color::Color;
use crate::model::deck::Deck;
use crate::model::discard::DiscardPile;
use crate::model::hand::Hand;
use crate::model::player::PlayerId;
use crate::model::stacks::PlayStacks;
use crate::model::tokens::Tokens;
use core::fmt;

/// Everything on the table for one game. Mutated only by the turn engine.
#[derive(Debug, Clone)]
pub struct GameState {
    config: GameConfig,
    deck: Deck,
    hands: Vec<Hand>,
    stacks: PlayStacks,
    discards: DiscardPile,
    tokens: Tokens,
    current: PlayerId,
    phase: GamePhase,
    turns_taken: u32,
}

impl GameState {
    /// Deals `config.hand_size` cards to each player round-robin from the top of `deck`.
    pub fn deal(config: GameConfig, mut deck: Deck) -> Result<Self, EngineError> {
        config.validate()?;

        let mut hands = vec![Hand::new(); config.player_count as usize];
        for _ in 0..config.hand_size {
            for hand in hands.iter_mut() {
                let card = deck.draw().ok_or(InvariantViolation::CardCountMismatch {
                    expected: TOTAL_CARDS,
                    found: deck.len(),
                })?;
                hand.add(card);
            }
        }

        let state = Self::assemble(config, deck, hands, PlayStacks::new(), DiscardPile::new());
        state.check_conservation()?;
        Ok(state)
    }

    /// Builds a mid-game position. The parts must account for exactly one full deck.
    pub fn from_parts(
        config: GameConfig,
        deck: Deck,
        hands: Vec<Hand>,
        stacks: PlayStacks,
        discards: DiscardPile,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        if hands.len() != config.player_count as usize {
            return Err(InvariantViolation::SeatCount {
                expected: config.player_count as usize,
                found: hands.len(),
            }
            .into());
        }
        let state = Self::assemble(config, deck, hands, stacks, discards);
        state.check_conservation()?;
        Ok(state)
    }

    fn assemble(
        config: GameConfig,
        deck: Deck,
        hands: Vec<Hand>,
        stacks: PlayStacks,
        discards: DiscardPile,
    ) -> Self {
        let phase = if stacks.all_complete() {
            GamePhase::Terminated(TerminationReason::StacksComplete)
        } else if deck.is_empty() {
            GamePhase::FinalRound {
                turns_remaining: config.player_count,
            }
        } else {
            GamePhase::InProgress
        };
        Self {
            config,
            deck,
            hands,
            stacks,
            discards,
            tokens: Tokens::new(config.max_hint_tokens, config.max_strikes),
            current: PlayerId::FIRST,
            phase,
            turns_taken: 0,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn player_count(&self) -> u8 {
        self.config.player_count
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn hand(&self, player: PlayerId) -> &Hand {
        &self.hands[player.index()]
    }

    pub fn hands(&self) -> &[Hand] {
        &self.hands
    }

    pub fn stacks(&self) -> &PlayStacks {
        &self.stacks
    }

    pub fn discards(&self) -> &DiscardPile {
        &self.discards
    }

    pub fn tokens(&self) -> &Tokens {
        &self.tokens
    }

    pub fn current_player(&self) -> PlayerId {
        self.current
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn turns_taken(&self) -> u32 {
        self.turns_taken
    }

    pub fn score(&self) -> u32 {
        self.stacks.score()
    }

    pub fn is_won(&self) -> bool {
        self.stacks.all_complete()
    }

    /// What `player` could see at a real table: everything except their own cards.
    pub fn table_view(&self, player: PlayerId) -> TableView<'_> {
        TableView::new(self, player)
    }

    /// The table plus `player`'s own hand.
    pub fn omniscient_view(&self, player: PlayerId) -> OmniscientView<'_> {
        OmniscientView::new(self.table_view(player), self.hand(player))
    }

    /// Cards across deck, hands, discard pile and stacks.
    pub fn card_count(&self) -> usize {
        self.deck.len()
            + self.hands.iter().map(Hand::len).sum::<usize>()
            + self.discards.len()
            + self.stacks.score() as usize
    }

    pub fn check_conservation(&self) -> Result<(), InvariantViolation> {
        let found = self.card_count();
        if found != TOTAL_CARDS {
            return Err(InvariantViolation::CardCountMismatch {
                expected: TOTAL_CARDS,
                found,
            });
        }
        Ok(())
    }

    pub(crate) fn hand_mut(&mut self, player: PlayerId) -> &mut Hand {
        &mut self.hands[player.index()]
    }

    pub(crate) fn deck_mut(&mut self) -> &mut Deck {
        &mut self.deck
    }

    pub(crate) fn stacks_mut(&mut self) -> &mut PlayStacks {
        &mut self.stacks
    }

    pub(crate) fn discards_mut(&mut self) -> &mut DiscardPile {
        &mut self.discards
    }

    pub(crate) fn tokens_mut(&mut self) -> &mut Tokens {
        &mut self.tokens
    }

    pub(crate) fn set_phase(&mut self, phase: GamePhase) {
        self.phase = phase;
    }

    pub(crate) fn finish_turn(&mut self) {
        self.turns_taken += 1;
        if !self.phase.is_terminated() {
            self.current = self.current.next(self.config.player_count);
        }
    }
}

/// Table overview: counters, stacks, discards grouped by color, then every hand.
impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "score {} | deck {} | hints {}/{} | strikes {}/{} | turn {} | {}",
            self.score(),
            self.deck.len(),
            self.tokens.hints(),
            self.tokens.max_hints(),
            self.tokens.strikes(),
            self.tokens.max_strikes(),
            self.turns_taken,
            self.phase,
        )?;

        f.write_str("stacks:")?;
        for color in Color::ALL {
            write!(f, " {color}{}", self.stacks.height(color))?;
        }
        f.write_str("\ndiscards:\n")?;
        for color in Color::ALL {
            write!(f, "  {color}:")?;
            let mut any = false;
            for number in 1..=MAX_NUMBER {
                for _ in 0..self.discards.count(color, number) {
                    write!(f, " {number}")?;
                    any = true;
                }
            }
            if !any {
                f.write_str(" -")?;
            }
            writeln!(f)?;
        }

        for seat in PlayerId::seats(self.config.player_count) {
            write!(f, "{seat}:")?;
            for card in self.hand(seat).iter() {
                write!(f, " {card}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
