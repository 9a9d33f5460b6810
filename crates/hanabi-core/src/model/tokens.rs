use serde::{Deserialize, Serialize};

/// Hint tokens available and strikes used, each bounded by its configured maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tokens {
    hints: u8,
    max_hints: u8,
    strikes: u8,
    max_strikes: u8,
}

impl Tokens {
    pub const fn new(max_hints: u8, max_strikes: u8) -> Self {
        Self {
            hints: max_hints,
            max_hints,
            strikes: 0,
            max_strikes,
        }
    }

    pub const fn hints(&self) -> u8 {
        self.hints
    }

    pub const fn max_hints(&self) -> u8 {
        self.max_hints
    }

    pub const fn strikes(&self) -> u8 {
        self.strikes
    }

    pub const fn max_strikes(&self) -> u8 {
        self.max_strikes
    }

    pub const fn hints_full(&self) -> bool {
        self.hints >= self.max_hints
    }

    /// Spends one hint token. Returns false (and changes nothing) when none remain.
    pub fn spend_hint(&mut self) -> bool {
        if self.hints == 0 {
            return false;
        }
        self.hints -= 1;
        true
    }

    /// Restores one hint token, capped at the maximum. Returns whether a token was added.
    pub fn restore_hint(&mut self) -> bool {
        if self.hints_full() {
            return false;
        }
        self.hints += 1;
        true
    }

    /// Records a failed play. Returns true once the strike limit is reached.
    pub fn add_strike(&mut self) -> bool {
        if self.strikes < self.max_strikes {
            self.strikes += 1;
        }
        self.strikes_exhausted()
    }

    pub const fn strikes_exhausted(&self) -> bool {
        self.strikes >= self.max_strikes
    }
}

#[cfg(test)]
mod tests {
    use super::Tokens;

    #[test]
    fn hints_stay_within_bounds() {
        let mut tokens = Tokens::new(2, 3);
        assert!(!tokens.restore_hint());
        assert_eq!(tokens.hints(), 2);
        assert!(tokens.spend_hint());
        assert!(tokens.spend_hint());
        assert!(!tokens.spend_hint());
        assert_eq!(tokens.hints(), 0);
        assert!(tokens.restore_hint());
        assert_eq!(tokens.hints(), 1);
    }

    #[test]
    fn strikes_saturate_at_maximum() {
        let mut tokens = Tokens::new(8, 2);
        assert!(!tokens.add_strike());
        assert!(tokens.add_strike());
        assert!(tokens.add_strike());
        assert_eq!(tokens.strikes(), 2);
        assert!(tokens.strikes_exhausted());
    }
}
