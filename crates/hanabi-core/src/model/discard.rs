use crate::model::card::{Card, MAX_NUMBER};
use crate::model::color::Color;

/// Append-only discard pile with per-card counts kept alongside.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscardPile {
    cards: Vec<Card>,
    counts: [[u8; MAX_NUMBER as usize]; Color::COUNT],
}

impl DiscardPile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cards(cards: impl IntoIterator<Item = Card>) -> Self {
        let mut pile = Self::new();
        for card in cards {
            pile.push(card);
        }
        pile
    }

    pub fn push(&mut self, card: Card) {
        self.counts[card.color.index()][(card.number - 1) as usize] += 1;
        self.cards.push(card);
    }

    /// Discarded copies of (`color`, `number`); zero for numbers outside `1..=5`.
    pub fn count(&self, color: Color, number: u8) -> u8 {
        if number == 0 || number > MAX_NUMBER {
            return 0;
        }
        self.counts[color.index()][(number - 1) as usize]
    }

    pub fn count_of(&self, card: Card) -> u8 {
        self.count(card.color, card.number)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}
