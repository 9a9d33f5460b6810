mod blind;
mod heuristic;

pub use blind::BlindPolicy;
pub use heuristic::{HeuristicPolicy, PolicyLevel};

use hanabi_core::game::action::Action;
use hanabi_core::game::state::GameState;
use hanabi_core::game::view::TableView;
use hanabi_core::model::hand::Hand;
use hanabi_core::model::player::PlayerId;

/// Whether a policy is allowed to read its own hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Omniscient,
    Blind,
}

/// Context provided to policies for decision-making
#[derive(Debug, Clone, Copy)]
pub struct PolicyContext<'a> {
    pub seat: PlayerId,
    pub table: TableView<'a>,
    /// Present only for [`Visibility::Omniscient`] policies.
    pub hand: Option<&'a Hand>,
}

impl<'a> PolicyContext<'a> {
    pub fn new(state: &'a GameState, seat: PlayerId, visibility: Visibility) -> Self {
        match visibility {
            Visibility::Omniscient => {
                let view = state.omniscient_view(seat);
                Self {
                    seat,
                    table: *view.table(),
                    hand: Some(view.hand()),
                }
            }
            Visibility::Blind => Self {
                seat,
                table: state.table_view(seat),
                hand: None,
            },
        }
    }
}

/// Unified interface for choosing one action per turn.
pub trait Policy: Send {
    fn name(&self) -> &'static str;

    fn visibility(&self) -> Visibility;

    /// Called only while the seat still holds at least one card.
    fn choose_action(&mut self, ctx: &PolicyContext) -> Action;
}

/// Why a policy picked its action; logged as the `reason` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecisionReason {
    PlayableLowest,
    UselessDiscard,
    HintFallback,
    ForcedDiscard,
    HiddenHand,
    BlindPlay,
    BlindHint,
    BlindDiscard,
}

impl DecisionReason {
    pub const ALL: [DecisionReason; 8] = [
        DecisionReason::PlayableLowest,
        DecisionReason::UselessDiscard,
        DecisionReason::HintFallback,
        DecisionReason::ForcedDiscard,
        DecisionReason::HiddenHand,
        DecisionReason::BlindPlay,
        DecisionReason::BlindHint,
        DecisionReason::BlindDiscard,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            DecisionReason::PlayableLowest => "playable_lowest",
            DecisionReason::UselessDiscard => "useless_discard",
            DecisionReason::HintFallback => "hint_fallback",
            DecisionReason::ForcedDiscard => "forced_discard",
            DecisionReason::HiddenHand => "hidden_hand",
            DecisionReason::BlindPlay => "blind_play",
            DecisionReason::BlindHint => "blind_hint",
            DecisionReason::BlindDiscard => "blind_discard",
        }
    }
}

fn log_decision(policy: &'static str, ctx: &PolicyContext, action: Action, reason: DecisionReason) {
    if !tracing::enabled!(target: "hanabi_bot::decision", tracing::Level::DEBUG) {
        return;
    }
    tracing::event!(
        target: "hanabi_bot::decision",
        tracing::Level::DEBUG,
        policy,
        seat = %ctx.seat,
        action = %action,
        hints = ctx.table.tokens().hints(),
        strikes = ctx.table.tokens().strikes(),
        deck = ctx.table.deck_len(),
        score = ctx.table.stacks().score(),
        reason = reason.as_str(),
    );
}
