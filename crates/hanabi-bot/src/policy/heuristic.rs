use super::{DecisionReason, Policy, PolicyContext, Visibility, log_decision};
use hanabi_core::game::action::Action;
use hanabi_core::game::view::TableView;
use hanabi_core::model::card::Card;
use hanabi_core::model::hand::Hand;
use hanabi_core::rules::{is_already_played, is_last_copy, is_playable, is_useful};

/// How much of the table the heuristic takes into account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PolicyLevel {
    /// Only cards already on the stacks count as useless; forced discards take slot 0.
    Naive,
    /// Also treats cards above a dead rank as useless; forced discards keep last copies.
    #[default]
    Refined,
}

impl PolicyLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            PolicyLevel::Naive => "naive",
            PolicyLevel::Refined => "refined",
        }
    }
}

/// Omniscient rule-based player: play, then clean up, then hint, then sacrifice.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicPolicy {
    level: PolicyLevel,
}

impl HeuristicPolicy {
    pub fn new(level: PolicyLevel) -> Self {
        Self { level }
    }

    pub fn naive() -> Self {
        Self::new(PolicyLevel::Naive)
    }

    pub fn refined() -> Self {
        Self::new(PolicyLevel::Refined)
    }

    pub fn level(&self) -> PolicyLevel {
        self.level
    }

    /// Picks an action for `hand` against what is on the table.
    pub fn decide(&self, hand: &Hand, table: &TableView<'_>) -> (Action, DecisionReason) {
        let stacks = table.stacks();
        let discards = table.discards();

        let playable = hand
            .iter()
            .enumerate()
            .filter(|(_, card)| is_playable(**card, stacks))
            .min_by_key(|(slot, card)| (card.number, *slot));
        if let Some((slot, _)) = playable {
            return (Action::Play(slot), DecisionReason::PlayableLowest);
        }

        let useless = hand.iter().position(|&card| match self.level {
            PolicyLevel::Naive => is_already_played(card, stacks),
            PolicyLevel::Refined => !is_useful(card, stacks, discards),
        });
        if let Some(slot) = useless {
            return (Action::Discard(slot), DecisionReason::UselessDiscard);
        }

        if table.tokens().hints() > 0 {
            return (Action::Hint, DecisionReason::HintFallback);
        }

        let slot = match self.level {
            PolicyLevel::Naive => 0,
            PolicyLevel::Refined => cheapest_slot(hand, |card| is_last_copy(card, discards)),
        };
        (Action::Discard(slot), DecisionReason::ForcedDiscard)
    }
}

/// Lowest-value card: spare copies before last copies, then lower numbers, then earlier slots.
fn cheapest_slot(hand: &Hand, last_copy: impl Fn(Card) -> bool) -> usize {
    hand.iter()
        .enumerate()
        .min_by_key(|&(slot, &card)| (last_copy(card), card.number, slot))
        .map(|(slot, _)| slot)
        .unwrap_or(0)
}

impl Policy for HeuristicPolicy {
    fn name(&self) -> &'static str {
        match self.level {
            PolicyLevel::Naive => "heuristic_naive",
            PolicyLevel::Refined => "heuristic",
        }
    }

    fn visibility(&self) -> Visibility {
        Visibility::Omniscient
    }

    fn choose_action(&mut self, ctx: &PolicyContext) -> Action {
        let (action, reason) = match ctx.hand {
            Some(hand) => self.decide(hand, &ctx.table),
            None if ctx.table.tokens().hints() > 0 => (Action::Hint, DecisionReason::HiddenHand),
            None => (Action::Discard(0), DecisionReason::HiddenHand),
        };
        log_decision(self.name(), ctx, action, reason);
        action
    }
}
