use core::fmt;
use serde::{Deserialize, Serialize};

/// A turn's choice. Cards are named by hand slot; for a player who can see
/// their own hand the slot identifies the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "slot", rename_all = "snake_case")]
pub enum Action {
    Play(usize),
    Discard(usize),
    Hint,
}

impl Action {
    pub const fn slot(self) -> Option<usize> {
        match self {
            Action::Play(slot) | Action::Discard(slot) => Some(slot),
            Action::Hint => None,
        }
    }

    pub const fn kind(self) -> &'static str {
        match self {
            Action::Play(_) => "play",
            Action::Discard(_) => "discard",
            Action::Hint => "hint",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Play(slot) => write!(f, "play#{slot}"),
            Action::Discard(slot) => write!(f, "discard#{slot}"),
            Action::Hint => f.write_str("hint"),
        }
    }
}
