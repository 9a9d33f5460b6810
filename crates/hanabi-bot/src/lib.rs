pub mod policy;
pub mod simulate;

pub use policy::{
    BlindPolicy, DecisionReason, HeuristicPolicy, Policy, PolicyContext, PolicyLevel, Visibility,
};
pub use simulate::{
    SimulationError, play_dealt, play_game, play_recorded_game, run_one_game,
};
