use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse telemetry JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Default, Serialize)]
pub struct TelemetrySummary {
    pub decisions: DecisionTelemetrySummary,
    pub games: GameTelemetrySummary,
    pub trials: TrialTelemetrySummary,
}

#[derive(Debug, Default, Serialize)]
pub struct DecisionTelemetrySummary {
    pub count: usize,
    pub avg_hints_available: Option<f64>,
    /// Decision reason counts keyed by policy name.
    pub reasons_by_policy: BTreeMap<String, BTreeMap<String, usize>>,
}

#[derive(Debug, Default, Serialize)]
pub struct GameTelemetrySummary {
    pub terminated: usize,
    pub final_rounds_started: usize,
    pub avg_final_turn: Option<f64>,
    pub termination_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Default, Serialize)]
pub struct TrialTelemetrySummary {
    pub completed: usize,
    pub invariant_violations: usize,
    pub avg_elapsed_ms: Option<f64>,
}

#[derive(Debug)]
struct Average {
    sum: f64,
    count: usize,
}

impl Average {
    fn new() -> Self {
        Self { sum: 0.0, count: 0 }
    }

    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

fn label<'a>(fields: &'a Map<String, Value>, key: &str) -> &'a str {
    fields
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("<unset>")
}

/// Aggregate decision, engine and trial events from a JSON telemetry log.
pub fn summarise_telemetry(path: &Path) -> Result<TelemetrySummary, TelemetryError> {
    if !path.exists() {
        return Ok(TelemetrySummary::default());
    }

    let file = File::open(path).map_err(|source| TelemetryError::Io {
        context: "opening telemetry log",
        source,
    })?;
    let reader = BufReader::new(file);

    let mut summary = TelemetrySummary::default();
    let mut hints_avg = Average::new();
    let mut final_turn_avg = Average::new();
    let mut elapsed_avg = Average::new();

    for line in reader.lines() {
        let line = line.map_err(|source| TelemetryError::Io {
            context: "reading telemetry line",
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let payload: Value = serde_json::from_str(&line)?;
        let target = payload
            .get("target")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let level = payload
            .get("level")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let fields = payload
            .get("fields")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        match target {
            "hanabi_bot::decision" => {
                let decisions = &mut summary.decisions;
                decisions.count += 1;
                if let Some(hints) = fields.get("hints").and_then(Value::as_f64) {
                    hints_avg.add(hints);
                }
                *decisions
                    .reasons_by_policy
                    .entry(label(&fields, "policy").to_string())
                    .or_default()
                    .entry(label(&fields, "reason").to_string())
                    .or_insert(0) += 1;
            }
            "hanabi_core::engine" => match label(&fields, "message") {
                "game terminated" => {
                    summary.games.terminated += 1;
                    if let Some(turn) = fields.get("turn").and_then(Value::as_f64) {
                        final_turn_avg.add(turn);
                    }
                    *summary
                        .games
                        .termination_counts
                        .entry(label(&fields, "reason").to_string())
                        .or_insert(0) += 1;
                }
                "deck exhausted; final round started" => {
                    summary.games.final_rounds_started += 1;
                }
                _ => {}
            },
            "hanabi_bench::trial" => {
                if level.eq_ignore_ascii_case("warn") {
                    summary.trials.invariant_violations += 1;
                } else {
                    summary.trials.completed += 1;
                    if let Some(ms) = fields.get("elapsed_ms").and_then(Value::as_f64) {
                        elapsed_avg.add(ms);
                    }
                }
            }
            _ => {}
        }
    }

    summary.decisions.avg_hints_available = hints_avg.mean();
    summary.games.avg_final_turn = final_turn_avg.mean();
    summary.trials.avg_elapsed_ms = elapsed_avg.mean();

    Ok(summary)
}

pub fn write_summary_outputs(
    telemetry_path: &Path,
    output_dir: &Path,
) -> Result<Option<TelemetryOutputs>, TelemetryError> {
    if !telemetry_path.exists() {
        return Ok(None);
    }

    let summary = summarise_telemetry(telemetry_path)?;
    let json_path = output_dir.join("telemetry_summary.json");
    let md_path = output_dir.join("telemetry_summary.md");

    std::fs::write(
        &json_path,
        serde_json::to_vec_pretty(&summary).map_err(TelemetryError::from)?,
    )
    .map_err(|source| TelemetryError::Io {
        context: "writing telemetry summary json",
        source,
    })?;

    let markdown = render_markdown(&summary, telemetry_path);
    std::fs::write(&md_path, markdown).map_err(|source| TelemetryError::Io {
        context: "writing telemetry summary markdown",
        source,
    })?;

    Ok(Some(TelemetryOutputs {
        summary,
        json_path,
        markdown_path: md_path,
    }))
}

pub fn append_highlights_to_markdown(
    summary_path: &Path,
    outputs: &TelemetryOutputs,
) -> Result<(), TelemetryError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(summary_path)
        .map_err(|source| TelemetryError::Io {
            context: "opening summary markdown for telemetry append",
            source,
        })?;

    let summary = &outputs.summary;
    let mut section = String::new();
    section.push_str("\n## Telemetry Highlights\n");
    section.push_str(&format!(
        "- Decision events captured: {}\n",
        summary.decisions.count
    ));
    if let Some(value) = summary.decisions.avg_hints_available {
        section.push_str(&format!("- Avg hint tokens at decision: {value:.2}\n"));
    }
    section.push_str(&format!(
        "- Games terminated: {} ({} reached the final round)\n",
        summary.games.terminated, summary.games.final_rounds_started
    ));
    if summary.trials.invariant_violations > 0 {
        section.push_str(&format!(
            "- Invariant violations: {}\n",
            summary.trials.invariant_violations
        ));
    }
    section.push_str(&reason_lines(&summary.decisions.reasons_by_policy, "### "));

    write!(file, "{section}").map_err(|source| TelemetryError::Io {
        context: "writing telemetry highlights",
        source,
    })?;

    Ok(())
}

fn reason_lines(by_policy: &BTreeMap<String, BTreeMap<String, usize>>, heading: &str) -> String {
    let mut output = String::new();
    if by_policy.is_empty() {
        output.push_str(&format!("\n{heading}Decision Reasons\n- <none>\n"));
        return output;
    }
    for (policy, reasons) in by_policy {
        output.push_str(&format!("\n{heading}Decision Reasons: {policy}\n"));
        for (reason, count) in reasons {
            output.push_str(&format!("- {reason}: {count}\n"));
        }
    }
    output
}

fn render_markdown(summary: &TelemetrySummary, telemetry_path: &Path) -> String {
    let mut output = String::new();
    output.push_str("# Telemetry Summary\n\n");
    output.push_str(&format!("- Source: `{}`\n", telemetry_path.display()));
    output.push('\n');

    output.push_str("## Games\n");
    output.push_str(&format!("- Terminated: {}\n", summary.games.terminated));
    output.push_str(&format!(
        "- Final rounds started: {}\n",
        summary.games.final_rounds_started
    ));
    if let Some(value) = summary.games.avg_final_turn {
        output.push_str(&format!("- Avg final turn: {value:.1}\n"));
    }
    for (reason, count) in &summary.games.termination_counts {
        output.push_str(&format!("  - {reason}: {count}\n"));
    }
    output.push('\n');

    output.push_str("## Trials\n");
    output.push_str(&format!("- Completed: {}\n", summary.trials.completed));
    output.push_str(&format!(
        "- Invariant violations: {}\n",
        summary.trials.invariant_violations
    ));
    if let Some(value) = summary.trials.avg_elapsed_ms {
        output.push_str(&format!("- Avg elapsed: {value:.2} ms\n"));
    }
    output.push('\n');

    output.push_str("## Decisions\n");
    output.push_str(&format!("- Events: {}\n", summary.decisions.count));
    if let Some(value) = summary.decisions.avg_hints_available {
        output.push_str(&format!("- Avg hint tokens: {value:.2}\n"));
    }
    output.push_str(&reason_lines(&summary.decisions.reasons_by_policy, "### "));
    output
}

#[derive(Debug)]
pub struct TelemetryOutputs {
    pub summary: TelemetrySummary,
    pub json_path: PathBuf,
    pub markdown_path: PathBuf,
}
