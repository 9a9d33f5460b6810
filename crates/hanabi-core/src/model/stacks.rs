use crate::model::card::{Card, MAX_NUMBER};
use crate::model::color::Color;
use serde::{Deserialize, Serialize};

/// Top number of each color's firework; 0 means nothing played yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayStacks {
    heights: [u8; Color::COUNT],
}

impl PlayStacks {
    pub const fn new() -> Self {
        Self {
            heights: [0; Color::COUNT],
        }
    }

    /// Stacks at the given heights, clamped to 5.
    pub fn from_heights(heights: [u8; Color::COUNT]) -> Self {
        Self {
            heights: heights.map(|h| h.min(MAX_NUMBER)),
        }
    }

    pub fn height(&self, color: Color) -> u8 {
        self.heights[color.index()]
    }

    pub fn heights(&self) -> &[u8; Color::COUNT] {
        &self.heights
    }

    pub fn accepts(&self, card: Card) -> bool {
        self.height(card.color) + 1 == card.number
    }

    /// Places `card` if it is the next number for its color. Returns whether it was placed.
    pub fn place(&mut self, card: Card) -> bool {
        if !self.accepts(card) {
            return false;
        }
        self.heights[card.color.index()] = card.number;
        true
    }

    pub fn is_complete(&self, color: Color) -> bool {
        self.height(color) == MAX_NUMBER
    }

    pub fn all_complete(&self) -> bool {
        Color::ALL.iter().all(|&color| self.is_complete(color))
    }

    /// Sum of all stack heights; also the number of cards on the table.
    pub fn score(&self) -> u32 {
        self.heights.iter().map(|&h| h as u32).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::PlayStacks;
    use crate::model::card::Card;
    use crate::model::color::Color;

    #[test]
    fn place_requires_next_number() {
        let mut stacks = PlayStacks::new();
        assert!(!stacks.place(Card::new(Color::Red, 2)));
        assert!(stacks.place(Card::new(Color::Red, 1)));
        assert!(!stacks.place(Card::new(Color::Red, 1)));
        assert!(stacks.place(Card::new(Color::Red, 2)));
        assert_eq!(stacks.height(Color::Red), 2);
        assert_eq!(stacks.score(), 2);
    }

    #[test]
    fn complete_only_when_every_color_reaches_five() {
        let mut stacks = PlayStacks::from_heights([5, 5, 5, 5, 4]);
        assert!(!stacks.all_complete());
        assert!(stacks.is_complete(Color::Blue));
        assert!(stacks.place(Card::new(Color::White, 5)));
        assert!(stacks.all_complete());
        assert_eq!(stacks.score(), 25);
    }

    #[test]
    fn from_heights_clamps() {
        let stacks = PlayStacks::from_heights([9, 0, 0, 0, 0]);
        assert_eq!(stacks.height(Color::Red), 5);
    }
}
