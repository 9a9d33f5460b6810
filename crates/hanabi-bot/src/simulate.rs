use crate::policy::{HeuristicPolicy, Policy, PolicyContext};
use hanabi_core::game::config::GameConfig;
use hanabi_core::game::engine::{GameResult, TurnEngine};
use hanabi_core::game::error::EngineError;
use hanabi_core::game::record::GameRecord;
use hanabi_core::game::state::GameState;
use hanabi_core::model::deck::Deck;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("game stopped before reaching a terminal phase")]
    Unfinished,
}

/// Plays one game of `player_count` seats with the refined omniscient heuristic.
pub fn run_one_game(player_count: u8, seed: u64) -> Result<GameResult, SimulationError> {
    let mut policy = HeuristicPolicy::refined();
    play_game(GameConfig::for_players(player_count), seed, &mut policy)
}

/// Deals a deck shuffled from `seed` and lets `policy` act for every seat.
pub fn play_game(
    config: GameConfig,
    seed: u64,
    policy: &mut dyn Policy,
) -> Result<GameResult, SimulationError> {
    let state = GameState::deal(config, Deck::shuffled_with_seed(seed))?;
    play_dealt(state, policy)
}

/// Plays out an already dealt position.
pub fn play_dealt(state: GameState, policy: &mut dyn Policy) -> Result<GameResult, SimulationError> {
    let mut engine = TurnEngine::new(state);
    drive(&mut engine, policy)
}

/// Like [`play_game`], but keeps every turn for later replay or export.
pub fn play_recorded_game(
    config: GameConfig,
    seed: u64,
    policy: &mut dyn Policy,
) -> Result<GameRecord, SimulationError> {
    let opening = GameState::deal(config, Deck::shuffled_with_seed(seed))?;
    let mut engine = TurnEngine::new(opening.clone()).with_recording();
    drive(&mut engine, policy)?;
    GameRecord::capture(seed, &opening, &engine).ok_or(SimulationError::Unfinished)
}

fn drive(engine: &mut TurnEngine, policy: &mut dyn Policy) -> Result<GameResult, SimulationError> {
    let visibility = policy.visibility();
    let result = engine.run(|state, seat| {
        let ctx = PolicyContext::new(state, seat, visibility);
        policy.choose_action(&ctx)
    })?;
    Ok(result)
}
