//! Read-only projections of [`GameState`] handed to decision policies.
//!
//! [`TableView`] is what a seated player legitimately sees: stacks, discards,
//! tokens, deck size and every hand except their own. [`OmniscientView`]
//! adds the viewer's own hand, which the real game never reveals.

use crate::game::config::GameConfig;
use crate::game::phase::GamePhase;
use crate::game::state::GameState;
use crate::model::card::{Card, MAX_NUMBER, copies_of};
use crate::model::color::Color;
use crate::model::discard::DiscardPile;
use crate::model::hand::Hand;
use crate::model::player::PlayerId;
use crate::model::stacks::PlayStacks;
use crate::model::tokens::Tokens;

#[derive(Debug, Clone, Copy)]
pub struct TableView<'a> {
    state: &'a GameState,
    seat: PlayerId,
}

impl<'a> TableView<'a> {
    pub(crate) fn new(state: &'a GameState, seat: PlayerId) -> Self {
        Self { state, seat }
    }

    pub fn seat(&self) -> PlayerId {
        self.seat
    }

    pub fn config(&self) -> &'a GameConfig {
        self.state.config()
    }

    pub fn stacks(&self) -> &'a PlayStacks {
        self.state.stacks()
    }

    pub fn discards(&self) -> &'a DiscardPile {
        self.state.discards()
    }

    pub fn tokens(&self) -> &'a Tokens {
        self.state.tokens()
    }

    pub fn deck_len(&self) -> usize {
        self.state.deck().len()
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase()
    }

    /// Number of cards the viewer holds; the faces stay hidden.
    pub fn own_hand_size(&self) -> usize {
        self.state.hand(self.seat).len()
    }

    /// Other players' hands in turn order, starting after the viewer.
    pub fn other_hands(&self) -> impl Iterator<Item = (PlayerId, &'a Hand)> + 'a {
        let count = self.state.player_count();
        let state = self.state;
        let mut seat = self.seat;
        (1..count).map(move |_| {
            seat = seat.next(count);
            (seat, state.hand(seat))
        })
    }

    /// Copies of `card` the viewer cannot locate: not on the stacks, not
    /// discarded, not in another player's hand. They are in the deck or in
    /// the viewer's own hand.
    pub fn unseen_copies(&self, card: Card) -> u8 {
        let on_stack = u8::from(self.stacks().height(card.color) >= card.number);
        let discarded = self.discards().count_of(card);
        let visible = self
            .other_hands()
            .map(|(_, hand)| hand.iter().filter(|&&c| c == card).count() as u8)
            .sum::<u8>();
        copies_of(card.number).saturating_sub(on_stack + discarded + visible)
    }

    /// Total cards the viewer cannot locate (deck plus own hand).
    pub fn unseen_total(&self) -> usize {
        self.deck_len() + self.own_hand_size()
    }

    /// Unseen cards that the stacks would accept right now.
    pub fn unseen_playable(&self) -> usize {
        Color::ALL
            .iter()
            .filter_map(|&color| {
                let next = self.stacks().height(color) + 1;
                (next <= MAX_NUMBER).then(|| self.unseen_copies(Card::new(color, next)) as usize)
            })
            .sum()
    }
}

/// A [`TableView`] that can also read the viewer's own hand.
#[derive(Debug, Clone, Copy)]
pub struct OmniscientView<'a> {
    table: TableView<'a>,
    hand: &'a Hand,
}

impl<'a> OmniscientView<'a> {
    pub(crate) fn new(table: TableView<'a>, hand: &'a Hand) -> Self {
        Self { table, hand }
    }

    pub fn table(&self) -> &TableView<'a> {
        &self.table
    }

    pub fn hand(&self) -> &'a Hand {
        self.hand
    }
}
