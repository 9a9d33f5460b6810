use crate::model::color::Color;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Highest number printed on a card; also the height of a finished stack.
pub const MAX_NUMBER: u8 = 5;

/// Copies of each number per color, indexed by `number - 1`.
pub const COPIES_PER_NUMBER: [u8; MAX_NUMBER as usize] = [3, 2, 2, 2, 1];

/// Cards of one color in a full deck.
pub const CARDS_PER_COLOR: usize = 10;

/// Cards in a full deck.
pub const TOTAL_CARDS: usize = CARDS_PER_COLOR * Color::COUNT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub color: Color,
    pub number: u8,
}

impl Card {
    /// Builds a card, rejecting numbers outside `1..=5`.
    pub const fn try_new(color: Color, number: u8) -> Option<Self> {
        if number >= 1 && number <= MAX_NUMBER {
            Some(Self { color, number })
        } else {
            None
        }
    }

    /// Builds a card; the number must be within `1..=5`.
    pub const fn new(color: Color, number: u8) -> Self {
        assert!(number >= 1 && number <= MAX_NUMBER, "card number out of range");
        Self { color, number }
    }

    /// Total copies of this exact card in a full deck.
    pub const fn copies(self) -> u8 {
        copies_of(self.number)
    }

    pub const fn is_five(self) -> bool {
        self.number == MAX_NUMBER
    }
}

/// Copies of `number` per color; zero for numbers outside `1..=5`.
pub const fn copies_of(number: u8) -> u8 {
    if number >= 1 && number <= MAX_NUMBER {
        COPIES_PER_NUMBER[(number - 1) as usize]
    } else {
        0
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.color, self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::{COPIES_PER_NUMBER, CARDS_PER_COLOR, Card, copies_of};
    use crate::model::color::Color;

    #[test]
    fn copy_distribution_matches_standard_deck() {
        let per_color: u32 = COPIES_PER_NUMBER.iter().map(|&c| c as u32).sum();
        assert_eq!(per_color as usize, CARDS_PER_COLOR);
        assert_eq!(copies_of(1), 3);
        assert_eq!(copies_of(4), 2);
        assert_eq!(copies_of(5), 1);
        assert_eq!(copies_of(0), 0);
        assert_eq!(copies_of(6), 0);
    }

    #[test]
    fn try_new_rejects_out_of_range_numbers() {
        assert!(Card::try_new(Color::Red, 0).is_none());
        assert!(Card::try_new(Color::Red, 6).is_none());
        assert_eq!(Card::try_new(Color::Blue, 3), Some(Card::new(Color::Blue, 3)));
    }

    #[test]
    fn display_joins_color_and_number() {
        assert_eq!(Card::new(Color::Green, 4).to_string(), "G4");
        assert!(Card::new(Color::White, 5).is_five());
    }
}
