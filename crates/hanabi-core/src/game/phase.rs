use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    InProgress,
    /// The deck is empty; each remaining turn counts down to the end.
    FinalRound { turns_remaining: u8 },
    Terminated(TerminationReason),
}

impl GamePhase {
    pub const fn is_terminated(self) -> bool {
        matches!(self, GamePhase::Terminated(_))
    }

    pub const fn termination(self) -> Option<TerminationReason> {
        match self {
            GamePhase::Terminated(reason) => Some(reason),
            _ => None,
        }
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GamePhase::InProgress => f.write_str("in progress"),
            GamePhase::FinalRound { turns_remaining } => {
                write!(f, "final round, {turns_remaining} turns left")
            }
            GamePhase::Terminated(reason) => write!(f, "terminated ({reason})"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    StacksComplete,
    StrikesExhausted,
    FinalRoundElapsed,
}

impl TerminationReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            TerminationReason::StacksComplete => "stacks_complete",
            TerminationReason::StrikesExhausted => "strikes_exhausted",
            TerminationReason::FinalRoundElapsed => "final_round_elapsed",
        }
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{GamePhase, TerminationReason};

    #[test]
    fn termination_is_exposed_only_when_terminated() {
        assert_eq!(GamePhase::InProgress.termination(), None);
        assert!(!GamePhase::FinalRound { turns_remaining: 2 }.is_terminated());
        let done = GamePhase::Terminated(TerminationReason::StrikesExhausted);
        assert!(done.is_terminated());
        assert_eq!(done.termination(), Some(TerminationReason::StrikesExhausted));
    }

    #[test]
    fn phases_display_for_the_table_overview() {
        assert_eq!(GamePhase::InProgress.to_string(), "in progress");
        assert_eq!(
            GamePhase::FinalRound { turns_remaining: 3 }.to_string(),
            "final round, 3 turns left"
        );
        assert_eq!(
            GamePhase::Terminated(TerminationReason::StacksComplete).to_string(),
            "terminated (stacks_complete)"
        );
    }

    #[test]
    fn reason_labels_are_snake_case() {
        assert_eq!(TerminationReason::FinalRoundElapsed.to_string(), "final_round_elapsed");
        let json = serde_json::to_string(&TerminationReason::StacksComplete).unwrap();
        assert_eq!(json, "\"stacks_complete\"");
    }
}
