use std::path::PathBuf;

use clap::Parser;

use hanabi_bench::config::{BenchmarkConfig, ResolvedOutputs};
use hanabi_bench::logging::init_logging;
use hanabi_bench::trials::TrialRunner;

/// Batch simulation harness for omniscient Hanabi policies.
#[derive(Debug, Parser)]
#[command(
    name = "hanabi-bench",
    author,
    version,
    about = "Deterministic Hanabi simulation harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of games per agent and table size.
    #[arg(long, value_name = "COUNT")]
    trials: Option<usize>,

    /// Override the run seed that every trial seed derives from.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Restrict the run to these table sizes (repeatable).
    #[arg(long = "players", value_name = "N")]
    players: Vec<u8>,

    /// Exit after validating the configuration (no games are played).
    #[arg(long)]
    validate_only: bool,

    /// Embed every game's turn record in the JSONL output.
    #[arg(long)]
    record_turns: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchmarkConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(trials) = cli.trials {
        config.trials.count = trials;
    }

    if let Some(seed) = cli.seed {
        config.trials.seed = seed;
    }

    if !cli.players.is_empty() {
        config.trials.player_counts = cli.players;
    }

    if cli.record_turns {
        config.logging.record_turns = true;
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let agent_count = config.agents.len();
    let run_id = config.run_id.clone();
    let trials = config.trials.count;
    let tables = config.trials.player_counts.clone();

    println!(
        "Loaded configuration '{run_id}' with {agent_count} agent{} ({trials} trials per table, players {tables:?})",
        if agent_count == 1 { "" } else { "s" }
    );

    if cli.validate_only {
        println!("Validation-only mode: simulation skipped.");
        return Ok(());
    }

    let logging_guard = init_logging(&config.logging, &outputs)?;
    let runner = TrialRunner::new(config, outputs)?;

    let mut summary = runner.run()?;
    drop(logging_guard);
    runner.write_telemetry(&mut summary)?;
    println!(
        "Run complete for '{run_id}': {} trials × {} tables → {} rows at {}",
        summary.trials_per_table,
        summary.player_counts.len(),
        summary.rows_written,
        summary.jsonl_path.display()
    );
    if summary.invariant_violations > 0 {
        println!(
            "Invariant violations: {} (see rows labelled invariant_violation)",
            summary.invariant_violations
        );
    }
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(plot_path) = summary.plot_path.as_ref() {
        println!("Average score plot: {}", plot_path.display());
    }
    if let Some(telemetry_path) = summary.telemetry_path.as_ref() {
        println!("Telemetry log: {}", telemetry_path.display());
    }
    if let Some(outputs) = summary.telemetry_outputs.as_ref() {
        println!("Telemetry summary (JSON): {}", outputs.json_path.display());
        println!(
            "Telemetry summary (Markdown): {}",
            outputs.markdown_path.display()
        );
        println!(
            "  Decisions: {} events, {} games terminated",
            outputs.summary.decisions.count, outputs.summary.games.terminated
        );
    }

    Ok(())
}
