use core::fmt;
use serde::{Deserialize, Serialize};

/// Seat index in turn order. Seat 0 acts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(u8);

impl PlayerId {
    pub const FIRST: PlayerId = PlayerId(0);

    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Next seat clockwise, wrapping after `player_count` seats.
    pub const fn next(self, player_count: u8) -> PlayerId {
        PlayerId((self.0 + 1) % player_count)
    }

    /// All seats of a table in turn order.
    pub fn seats(player_count: u8) -> impl Iterator<Item = PlayerId> {
        (0..player_count).map(PlayerId)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::PlayerId;

    #[test]
    fn next_wraps_around() {
        assert_eq!(PlayerId::new(3).next(4), PlayerId::FIRST);
        assert_eq!(PlayerId::new(0).next(2), PlayerId::new(1));
    }

    #[test]
    fn seats_enumerate_in_order() {
        let seats: Vec<_> = PlayerId::seats(3).collect();
        assert_eq!(seats, vec![PlayerId::new(0), PlayerId::new(1), PlayerId::new(2)]);
        for (i, seat) in seats.iter().enumerate() {
            assert_eq!(seat.index(), i);
        }
        assert_eq!(PlayerId::new(2).to_string(), "P2");
    }
}
