use super::{DecisionReason, Policy, PolicyContext, Visibility, log_decision};
use hanabi_core::game::action::Action;

pub const DEFAULT_PLAY_THRESHOLD: f64 = 0.25;

/// Plays without looking at its own cards, guessing from what is still unseen.
///
/// The newest card is played when the chance that an unseen card fits a stack
/// reaches the threshold and a strike can be spared; otherwise it hints, and
/// with no tokens left it discards its oldest card.
#[derive(Debug, Clone, Copy)]
pub struct BlindPolicy {
    play_threshold: f64,
}

impl BlindPolicy {
    pub fn new(play_threshold: f64) -> Self {
        Self {
            play_threshold: play_threshold.clamp(0.0, 1.0),
        }
    }

    pub fn play_threshold(&self) -> f64 {
        self.play_threshold
    }
}

impl Default for BlindPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_PLAY_THRESHOLD)
    }
}

impl Policy for BlindPolicy {
    fn name(&self) -> &'static str {
        "blind"
    }

    fn visibility(&self) -> Visibility {
        Visibility::Blind
    }

    fn choose_action(&mut self, ctx: &PolicyContext) -> Action {
        let table = &ctx.table;
        let tokens = table.tokens();
        let unseen = table.unseen_total();
        let chance = if unseen == 0 {
            0.0
        } else {
            table.unseen_playable() as f64 / unseen as f64
        };
        let spare_strikes = tokens.max_strikes().saturating_sub(tokens.strikes()) > 1;

        let (action, reason) = if chance >= self.play_threshold && spare_strikes {
            let newest = table.own_hand_size().saturating_sub(1);
            (Action::Play(newest), DecisionReason::BlindPlay)
        } else if tokens.hints() > 0 {
            (Action::Hint, DecisionReason::BlindHint)
        } else {
            (Action::Discard(0), DecisionReason::BlindDiscard)
        };
        log_decision(self.name(), ctx, action, reason);
        action
    }
}

#[cfg(test)]
mod tests {
    use super::BlindPolicy;
    use crate::policy::{Policy, PolicyContext, Visibility};
    use hanabi_core::game::action::Action;
    use hanabi_core::game::config::GameConfig;
    use hanabi_core::game::state::GameState;
    use hanabi_core::model::deck::Deck;
    use hanabi_core::model::player::PlayerId;

    #[test]
    fn threshold_is_clamped() {
        assert_eq!(BlindPolicy::new(3.0).play_threshold(), 1.0);
        assert_eq!(BlindPolicy::new(-1.0).play_threshold(), 0.0);
    }

    #[test]
    fn hints_when_the_odds_are_poor() {
        let state = GameState::deal(GameConfig::for_players(2), Deck::shuffled_with_seed(9)).unwrap();
        let mut policy = BlindPolicy::new(1.0);
        assert_eq!(policy.visibility(), Visibility::Blind);
        let ctx = PolicyContext::new(&state, PlayerId::new(0), policy.visibility());
        assert_eq!(policy.choose_action(&ctx), Action::Hint);
    }

    #[test]
    fn plays_the_newest_card_when_the_odds_are_good() {
        let state = GameState::deal(GameConfig::for_players(4), Deck::shuffled_with_seed(9)).unwrap();
        let mut policy = BlindPolicy::new(0.0);
        let ctx = PolicyContext::new(&state, PlayerId::new(0), policy.visibility());
        assert_eq!(policy.choose_action(&ctx), Action::Play(3));
    }
}
