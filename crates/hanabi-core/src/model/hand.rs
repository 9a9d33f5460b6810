use crate::model::card::Card;
use std::vec::Vec;

/// A player's cards in slot order. Slot 0 is the oldest card; draws append.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    pub fn with_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn add(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Removes the card at `slot`, shifting newer cards down by one.
    pub fn take(&mut self, slot: usize) -> Option<Card> {
        if slot < self.cards.len() {
            Some(self.cards.remove(slot))
        } else {
            None
        }
    }

    pub fn get(&self, slot: usize) -> Option<Card> {
        self.cards.get(slot).copied()
    }

    pub fn position(&self, card: Card) -> Option<usize> {
        self.cards.iter().position(|&c| c == card)
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

#[cfg(test)]
mod tests {
    use super::Hand;
    use crate::model::card::Card;
    use crate::model::color::Color;

    #[test]
    fn add_appends_and_take_keeps_order() {
        let mut hand = Hand::new();
        hand.add(Card::new(Color::Red, 1));
        hand.add(Card::new(Color::Blue, 3));
        hand.add(Card::new(Color::Green, 5));

        assert_eq!(hand.take(1), Some(Card::new(Color::Blue, 3)));
        assert_eq!(
            hand.cards(),
            &[Card::new(Color::Red, 1), Card::new(Color::Green, 5)]
        );

        hand.add(Card::new(Color::White, 2));
        assert_eq!(hand.get(2), Some(Card::new(Color::White, 2)));
    }

    #[test]
    fn take_out_of_range_is_none() {
        let mut hand = Hand::with_cards(vec![Card::new(Color::Yellow, 4)]);
        assert_eq!(hand.take(1), None);
        assert_eq!(hand.len(), 1);
        assert_eq!(hand.position(Card::new(Color::Yellow, 4)), Some(0));
        assert!(!hand.contains(Card::new(Color::Yellow, 5)));
    }
}
