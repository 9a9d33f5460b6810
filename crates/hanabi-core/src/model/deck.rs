use crate::model::card::{Card, MAX_NUMBER, TOTAL_CARDS, copies_of};
use crate::model::color::Color;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use thiserror::Error;

/// Draw pile. The top card is the last element so drawing is a `pop`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeckError {
    #[error("card {card} appears more often than the {copies} copies in a full deck")]
    TooManyCopies { card: Card, copies: u8 },
}

impl Deck {
    /// Full deck in canonical order (colors in order, numbers ascending), top card first.
    pub fn standard() -> Self {
        Self::from_top(standard_cards())
    }

    pub fn shuffled<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::standard();
        deck.shuffle_in_place(rng);
        deck
    }

    pub fn shuffled_with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::shuffled(&mut rng)
    }

    /// Builds a deck whose first element is the top card.
    pub fn from_top(mut cards: Vec<Card>) -> Self {
        cards.reverse();
        Self { cards }
    }

    /// Places `top` (first element drawn first) above the rest of a full
    /// deck, which follows in canonical order.
    pub fn arranged(top: &[Card]) -> Result<Self, DeckError> {
        let mut rest = standard_cards();
        for &card in top {
            match rest.iter().position(|&c| c == card) {
                Some(index) => {
                    rest.remove(index);
                }
                None => {
                    return Err(DeckError::TooManyCopies {
                        card,
                        copies: card.copies(),
                    });
                }
            }
        }
        let mut ordered = Vec::with_capacity(TOTAL_CARDS);
        ordered.extend_from_slice(top);
        ordered.extend(rest);
        Ok(Self::from_top(ordered))
    }

    pub fn shuffle_in_place<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// Removes and returns the top card, or `None` once the deck is exhausted.
    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn peek(&self) -> Option<Card> {
        self.cards.last().copied()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Remaining cards, top card first.
    pub fn iter_from_top(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter().rev()
    }
}

fn standard_cards() -> Vec<Card> {
    let mut cards = Vec::with_capacity(TOTAL_CARDS);
    for color in Color::ALL {
        for number in 1..=MAX_NUMBER {
            for _ in 0..copies_of(number) {
                cards.push(Card::new(color, number));
            }
        }
    }
    cards
}

#[cfg(test)]
mod tests {
    use super::{Deck, DeckError};
    use crate::model::card::{Card, TOTAL_CARDS};
    use crate::model::color::Color;

    #[test]
    fn standard_deck_has_fifty_cards() {
        let deck = Deck::standard();
        assert_eq!(deck.len(), TOTAL_CARDS);
        let red_ones = deck
            .iter_from_top()
            .filter(|&&c| c == Card::new(Color::Red, 1))
            .count();
        assert_eq!(red_ones, 3);
    }

    #[test]
    fn shuffle_with_seed_is_deterministic() {
        let deck_a = Deck::shuffled_with_seed(42);
        let deck_b = Deck::shuffled_with_seed(42);
        assert_eq!(deck_a, deck_b);
    }

    #[test]
    fn shuffle_with_different_seeds_differs() {
        let deck_a = Deck::shuffled_with_seed(1);
        let deck_b = Deck::shuffled_with_seed(2);
        assert_ne!(deck_a, deck_b);
    }

    #[test]
    fn draw_takes_from_top_until_empty() {
        let mut deck = Deck::from_top(vec![
            Card::new(Color::Blue, 2),
            Card::new(Color::Red, 5),
        ]);
        assert_eq!(deck.peek(), Some(Card::new(Color::Blue, 2)));
        assert_eq!(deck.draw(), Some(Card::new(Color::Blue, 2)));
        assert_eq!(deck.draw(), Some(Card::new(Color::Red, 5)));
        assert!(deck.is_empty());
        assert_eq!(deck.draw(), None);
    }

    #[test]
    fn arranged_puts_requested_cards_on_top() {
        let top = [Card::new(Color::White, 5), Card::new(Color::Green, 1)];
        let mut deck = Deck::arranged(&top).unwrap();
        assert_eq!(deck.len(), TOTAL_CARDS);
        assert_eq!(deck.draw(), Some(top[0]));
        assert_eq!(deck.draw(), Some(top[1]));
        let remaining_white_fives = deck
            .iter_from_top()
            .filter(|&&c| c == Card::new(Color::White, 5))
            .count();
        assert_eq!(remaining_white_fives, 0);
    }

    #[test]
    fn arranged_rejects_extra_copies() {
        let five = Card::new(Color::Red, 5);
        let err = Deck::arranged(&[five, five]).unwrap_err();
        assert_eq!(err, DeckError::TooManyCopies { card: five, copies: 1 });
    }
}
