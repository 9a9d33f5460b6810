mod agents;

pub use agents::{AgentBlueprint, AgentError};

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use hanabi_bot::{SimulationError, play_game, play_recorded_game};
use hanabi_core::game::engine::GameResult;
use hanabi_core::game::error::EngineError;
use hanabi_core::game::record::GameRecord;
use rand::{RngCore, SeedableRng, rngs::StdRng};
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::analytics::{AnalyticsCollector, AnalyticsError};
use crate::config::{BenchmarkConfig, ResolvedOutputs};
use crate::logging::TELEMETRY_FILE;
use crate::telemetry::{
    TelemetryError, TelemetryOutputs, append_highlights_to_markdown, write_summary_outputs,
};

/// Label written in place of a termination reason when a game breaks an invariant.
pub const INVARIANT_VIOLATION: &str = "invariant_violation";

/// Primary entry point for running benchmark trials.
pub struct TrialRunner {
    config: BenchmarkConfig,
    outputs: ResolvedOutputs,
    agents: Vec<AgentBlueprint>,
    logging_enabled: bool,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub trials_per_table: usize,
    pub player_counts: Vec<u8>,
    pub rows_written: usize,
    pub invariant_violations: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub plot_path: Option<PathBuf>,
    pub telemetry_path: Option<PathBuf>,
    pub telemetry_outputs: Option<TelemetryOutputs>,
}

impl TrialRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: BenchmarkConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let agents = AgentBlueprint::from_configs(&config.agents)?;
        Ok(Self {
            logging_enabled: config.logging.enable_structured,
            config,
            outputs,
            agents,
        })
    }

    /// Execute every trial, streaming JSONL rows to disk in trial order.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;
        if !self.outputs.plots_dir.as_os_str().is_empty() {
            fs::create_dir_all(&self.outputs.plots_dir)?;
        }

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut analytics = AnalyticsCollector::new(&self.config)?;
        let mut rows_written = 0usize;
        let mut invariant_violations = 0usize;

        for &players in &self.config.trials.player_counts {
            let seeds = trial_seeds(self.config.trials.seed, self.config.trials.count);
            for agent in &self.agents {
                let outcomes = seeds
                    .par_iter()
                    .enumerate()
                    .map(|(trial, &seed)| self.play_trial(agent, players, trial, seed))
                    .collect::<Result<Vec<_>, _>>()?;

                for outcome in &outcomes {
                    analytics.record_trial(outcome)?;
                    if outcome.violation.is_some() {
                        invariant_violations += 1;
                    }
                    write_trial_row(&mut writer, &self.config.run_id, outcome)?;
                    rows_written += 1;
                }
            }
        }

        writer.flush()?;

        let summary = analytics.finalize()?;
        summary.write_markdown(&self.outputs.summary_md)?;
        let plot_path = match summary.render_plot(&self.outputs.plots_dir) {
            Ok(path) => Some(path),
            Err(err) => {
                eprintln!("WARN: {}", err);
                None
            }
        };

        let telemetry_path = self
            .logging_enabled
            .then(|| self.outputs.telemetry_dir().join(TELEMETRY_FILE));

        Ok(RunSummary {
            trials_per_table: self.config.trials.count,
            player_counts: self.config.trials.player_counts.clone(),
            rows_written,
            invariant_violations,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            plot_path,
            telemetry_path,
            telemetry_outputs: None,
        })
    }

    /// Summarises the telemetry log of a finished run and appends the
    /// highlights to its summary markdown. Call once the logging guard has
    /// been dropped so the log is complete.
    pub fn write_telemetry(&self, summary: &mut RunSummary) -> Result<(), RunnerError> {
        let Some(path) = summary.telemetry_path.as_ref() else {
            return Ok(());
        };
        let outputs = write_summary_outputs(path, &self.outputs.telemetry_dir())?;
        if let Some(outputs) = outputs.as_ref() {
            append_highlights_to_markdown(&summary.summary_path, outputs)?;
        }
        summary.telemetry_outputs = outputs;
        Ok(())
    }

    fn play_trial(
        &self,
        agent: &AgentBlueprint,
        players: u8,
        trial: usize,
        seed: u64,
    ) -> Result<TrialOutcome, RunnerError> {
        let config = self.config.rules.game_config(players);
        let mut policy = agent.spawn_policy();
        let start = Instant::now();
        let played = if self.config.logging.record_turns {
            play_recorded_game(config, seed, policy.as_mut())
                .map(|record| (record.result, Some(record)))
        } else {
            play_game(config, seed, policy.as_mut()).map(|result| (result, None))
        };
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        let (result, record, violation) = match played {
            Ok((result, record)) => (Some(result), record, None),
            Err(SimulationError::Engine(EngineError::Invariant(err))) => {
                event!(
                    target: "hanabi_bench::trial",
                    Level::WARN,
                    run_id = %self.config.run_id,
                    agent = %agent.name,
                    players,
                    trial,
                    seed,
                    error = %err,
                    "invariant violation"
                );
                (None, None, Some(err.to_string()))
            }
            Err(err) => {
                return Err(RunnerError::Game {
                    message: format!("{} with {players} players, seed {seed}: {err}", agent.name),
                });
            }
        };

        if self.logging_enabled
            && tracing::enabled!(Level::INFO)
            && let Some(result) = result.as_ref()
        {
            event!(
                target: "hanabi_bench::trial",
                Level::INFO,
                run_id = %self.config.run_id,
                agent = %agent.name,
                players,
                trial,
                score = result.score,
                reason = %result.reason,
                elapsed_ms
            );
        }

        Ok(TrialOutcome {
            agent: agent.name.clone(),
            players,
            trial,
            seed,
            result,
            violation,
            record,
            elapsed_ms,
        })
    }
}

/// Seeds drawn in sequence from the run seed; every agent replays the same deals.
pub fn trial_seeds(seed: u64, count: usize) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count).map(|_| rng.next_u64()).collect()
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// One game played by one agent.
#[derive(Debug, Clone)]
pub struct TrialOutcome {
    pub agent: String,
    pub players: u8,
    pub trial: usize,
    pub seed: u64,
    /// `None` when the game stopped on an invariant violation.
    pub result: Option<GameResult>,
    pub violation: Option<String>,
    pub record: Option<GameRecord>,
    pub elapsed_ms: f64,
}

#[derive(Serialize)]
struct TrialLogRow<'a> {
    run_id: &'a str,
    trial_id: String,
    player_count: u8,
    agent: &'a str,
    seed: u64,
    score: u32,
    won: bool,
    termination: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    violation: Option<&'a str>,
    turns: u32,
    strikes: u8,
    plays: u32,
    misplays: u32,
    discards: u32,
    hints: u32,
    elapsed_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    record: Option<&'a GameRecord>,
}

fn write_trial_row(
    writer: &mut BufWriter<File>,
    run_id: &str,
    outcome: &TrialOutcome,
) -> Result<(), RunnerError> {
    let result = outcome.result.as_ref();
    let row = TrialLogRow {
        run_id,
        trial_id: format!("N{}_T{:05}", outcome.players, outcome.trial),
        player_count: outcome.players,
        agent: &outcome.agent,
        seed: outcome.seed,
        score: result.map_or(0, |r| r.score),
        won: result.is_some_and(|r| r.won),
        termination: result.map_or(INVARIANT_VIOLATION, |r| r.reason.as_str()),
        violation: outcome.violation.as_deref(),
        turns: result.map_or(0, |r| r.turns),
        strikes: result.map_or(0, |r| r.strikes),
        plays: result.map_or(0, |r| r.plays),
        misplays: result.map_or(0, |r| r.misplays),
        discards: result.map_or(0, |r| r.discards),
        hints: result.map_or(0, |r| r.hints),
        elapsed_ms: outcome.elapsed_ms,
        record: outcome.record.as_ref(),
    };

    serde_json::to_writer(&mut *writer, &row)?;
    writer.write_all(b"\n")?;
    Ok(())
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("{0}")]
    Agent(#[from] AgentError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("game execution failed: {message}")]
    Game { message: String },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
    #[error("telemetry summarisation failed: {0}")]
    Telemetry(#[from] TelemetryError),
}

#[cfg(test)]
mod tests {
    use super::{TrialRunner, trial_seeds};
    use crate::config::BenchmarkConfig;
    use std::fs;

    #[test]
    fn trial_seeds_are_reproducible_prefixes() {
        let short = trial_seeds(42, 3);
        let long = trial_seeds(42, 10);
        assert_eq!(short.len(), 3);
        assert_eq!(&long[..3], short.as_slice());
        assert_ne!(trial_seeds(43, 3), short);
    }

    #[test]
    fn telemetry_is_summarised_after_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = format!(
            r#"
run_id: "telemetry"
trials:
  count: 2
  player_counts: [2]
agents:
  - name: "refined"
    kind: "heuristic"
outputs:
  jsonl: "{jsonl}"
  summary_md: "{summary}"
  plots_dir: "{plots}"
metrics:
  baseline: "refined"
logging:
  enable_structured: true
"#,
            jsonl = dir.path().join("trials.jsonl").display(),
            summary = dir.path().join("summary.md").display(),
            plots = dir.path().join("plots").display()
        );
        let mut config: BenchmarkConfig = serde_yaml::from_str(&yaml).unwrap();
        config.validate().unwrap();
        let outputs = config.resolved_outputs();
        let runner = TrialRunner::new(config, outputs).unwrap();

        let mut summary = runner.run().unwrap();
        assert!(summary.telemetry_outputs.is_none());
        let log = summary.telemetry_path.clone().unwrap();
        assert_eq!(log, dir.path().join("telemetry.jsonl"));
        fs::write(
            &log,
            concat!(
                r#"{"level":"DEBUG","target":"hanabi_bot::decision","fields":{"policy":"heuristic","reason":"playable_lowest","hints":8}}"#,
                "\n",
                r#"{"level":"INFO","target":"hanabi_core::engine","fields":{"message":"game terminated","turn":30,"reason":"stacks_complete"}}"#,
                "\n",
            ),
        )
        .unwrap();

        runner.write_telemetry(&mut summary).unwrap();
        let outputs = summary.telemetry_outputs.as_ref().unwrap();
        assert_eq!(outputs.summary.decisions.count, 1);
        assert_eq!(outputs.summary.games.terminated, 1);
        let markdown = fs::read_to_string(dir.path().join("summary.md")).unwrap();
        assert!(markdown.contains("## Telemetry Highlights"));
    }
}
