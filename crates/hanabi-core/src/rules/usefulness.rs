//! Card usefulness inference from the public table: play stacks and discards.
//!
//! Everything here is a pure function of the stacks and the discard pile, so
//! the same answers hold for every player at the table.

use crate::model::card::{Card, MAX_NUMBER, copies_of};
use crate::model::color::Color;
use crate::model::discard::DiscardPile;
use crate::model::stacks::PlayStacks;

/// The stack for the card's color accepts it right now.
pub fn is_playable(card: Card, stacks: &PlayStacks) -> bool {
    stacks.accepts(card)
}

/// The card's number has already been reached on its stack.
pub fn is_already_played(card: Card, stacks: &PlayStacks) -> bool {
    card.number <= stacks.height(card.color)
}

/// Highest number `color` can still reach. A number is unreachable once every
/// copy of some lower number above the current height has been discarded.
pub fn max_reachable(color: Color, stacks: &PlayStacks, discards: &DiscardPile) -> u8 {
    let height = stacks.height(color);
    for number in (height + 1)..=MAX_NUMBER {
        if discards.count(color, number) >= copies_of(number) {
            return number - 1;
        }
    }
    MAX_NUMBER
}

/// Whether the color's stack can never reach `card.number` because a number
/// between the current height and the card is gone from the game.
pub fn is_color_killed_below(card: Card, stacks: &PlayStacks, discards: &DiscardPile) -> bool {
    max_reachable(card.color, stacks, discards) < card.number
}

/// A card can still be played at some point in this game.
pub fn is_useful(card: Card, stacks: &PlayStacks, discards: &DiscardPile) -> bool {
    !is_already_played(card, stacks) && !is_color_killed_below(card, stacks, discards)
}

/// Every other copy of `card` is already in the discard pile.
pub fn is_last_copy(card: Card, discards: &DiscardPile) -> bool {
    discards.count_of(card) + 1 >= copies_of(card.number)
}
