use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Color {
    Red = 0,
    Yellow = 1,
    Green = 2,
    Blue = 3,
    White = 4,
}

impl Color {
    pub const COUNT: usize = 5;

    pub const ALL: [Color; Color::COUNT] = [
        Color::Red,
        Color::Yellow,
        Color::Green,
        Color::Blue,
        Color::White,
    ];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Color::Red),
            1 => Some(Color::Yellow),
            2 => Some(Color::Green),
            3 => Some(Color::Blue),
            4 => Some(Color::White),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Color::Red => "R",
            Color::Yellow => "Y",
            Color::Green => "G",
            Color::Blue => "B",
            Color::White => "W",
        };
        f.write_str(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::Color;

    #[test]
    fn display_returns_ascii_symbols() {
        assert_eq!(Color::Red.to_string(), "R");
        assert_eq!(Color::White.to_string(), "W");
    }

    #[test]
    fn from_index_maps_valid_values() {
        assert_eq!(Color::from_index(2), Some(Color::Green));
        assert_eq!(Color::from_index(5), None);
        for (i, color) in Color::ALL.iter().enumerate() {
            assert_eq!(color.index(), i);
        }
    }
}
