use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use hanabi_core::game::phase::TerminationReason;
use hanabi_core::model::card::MAX_NUMBER;
use hanabi_core::model::color::Color as CardColor;
use plotters::prelude::*;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

use crate::config::{AgentKind, BenchmarkConfig};
use crate::trials::TrialOutcome;

const CONFIDENCE_Z: f64 = 1.96; // 95% CI
const MAX_SCORE: usize = CardColor::COUNT * MAX_NUMBER as usize;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("baseline agent '{0}' not present in trial results")]
    MissingBaseline(String),
    #[error("agent '{0}' defined in results but missing from configuration")]
    UnknownAgent(String),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to render plot: {0}")]
    Plot(String),
}

type GroupKey = (String, u8);

/// Aggregates trial outcomes per (agent, player count).
pub struct AnalyticsCollector {
    baseline: String,
    kinds: HashMap<String, AgentKind>,
    groups: HashMap<GroupKey, GroupAccumulator>,
    order: Vec<GroupKey>,
}

impl AnalyticsCollector {
    pub fn new(config: &BenchmarkConfig) -> Result<Self, AnalyticsError> {
        let baseline = config
            .metrics
            .baseline
            .clone()
            .ok_or_else(|| AnalyticsError::MissingBaseline("<unset>".into()))?;

        let mut groups = HashMap::new();
        let mut order = Vec::new();
        for &players in &config.trials.player_counts {
            for agent in &config.agents {
                let key = (agent.name.clone(), players);
                groups.insert(key.clone(), GroupAccumulator::default());
                order.push(key);
            }
        }

        Ok(Self {
            baseline,
            kinds: config
                .agents
                .iter()
                .map(|agent| (agent.name.clone(), agent.kind.clone()))
                .collect(),
            groups,
            order,
        })
    }

    pub fn record_trial(&mut self, outcome: &TrialOutcome) -> Result<(), AnalyticsError> {
        let acc = self
            .groups
            .get_mut(&(outcome.agent.clone(), outcome.players))
            .ok_or_else(|| AnalyticsError::UnknownAgent(outcome.agent.clone()))?;

        match outcome.result.as_ref() {
            Some(result) => {
                acc.games += 1;
                acc.total_turns += u64::from(result.turns);
                if result.won {
                    acc.wins += 1;
                }
                if result.reason == TerminationReason::StrikesExhausted {
                    acc.strike_outs += 1;
                }
                acc.histogram[(result.score as usize).min(MAX_SCORE)] += 1;
                acc.scores.insert(outcome.trial, f64::from(result.score));
            }
            None => acc.violations += 1,
        }
        Ok(())
    }

    pub fn finalize(self) -> Result<AnalyticsSummary, AnalyticsError> {
        if !self.kinds.contains_key(&self.baseline) {
            return Err(AnalyticsError::MissingBaseline(self.baseline));
        }

        let mut reports = Vec::new();
        for key in &self.order {
            let Some(acc) = self.groups.get(key) else {
                continue;
            };
            let baseline_scores = self
                .groups
                .get(&(self.baseline.clone(), key.1))
                .map(|baseline| &baseline.scores);

            let (p_value, paired_trials) = if key.0 == self.baseline {
                (1.0, acc.scores.len())
            } else if let Some(baseline_scores) = baseline_scores {
                let diffs: Vec<f64> = acc
                    .scores
                    .iter()
                    .filter_map(|(trial, score)| baseline_scores.get(trial).map(|b| score - b))
                    .collect();
                wilcoxon_signed_rank(diffs)
            } else {
                (1.0, 0)
            };

            let kind = self
                .kinds
                .get(&key.0)
                .cloned()
                .ok_or_else(|| AnalyticsError::UnknownAgent(key.0.clone()))?;
            reports.push(acc.report(key, kind, p_value, paired_trials));
        }

        Ok(AnalyticsSummary {
            baseline: self.baseline,
            groups: reports,
        }
        .enrich())
    }
}

#[derive(Default)]
struct GroupAccumulator {
    games: usize,
    wins: usize,
    strike_outs: usize,
    violations: usize,
    total_turns: u64,
    histogram: [usize; MAX_SCORE + 1],
    /// Score per trial index, used to pair agents on identical deals.
    scores: HashMap<usize, f64>,
}

impl GroupAccumulator {
    fn report(&self, key: &GroupKey, kind: AgentKind, p_value: f64, paired_trials: usize) -> GroupReport {
        let mut ordered: Vec<(usize, f64)> = self.scores.iter().map(|(&t, &s)| (t, s)).collect();
        ordered.sort_by_key(|(trial, _)| *trial);
        let points: Vec<f64> = ordered.into_iter().map(|(_, score)| score).collect();

        let avg_score = if points.is_empty() {
            0.0
        } else {
            points.iter().sum::<f64>() / points.len() as f64
        };
        let avg_turns = if self.games == 0 {
            0.0
        } else {
            self.total_turns as f64 / self.games as f64
        };

        GroupReport {
            agent: key.0.clone(),
            kind,
            players: key.1,
            games: self.games,
            wins: self.wins,
            win_rate: ratio(self.wins, self.games),
            avg_score,
            ci95: confidence_interval(&points),
            strike_outs: self.strike_outs,
            avg_turns,
            histogram: self.histogram.to_vec(),
            invariant_violations: self.violations,
            p_value,
            paired_trials,
            delta_vs_baseline: 0.0,
        }
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Two-sided paired test with tie correction and continuity correction.
fn wilcoxon_signed_rank(diffs: Vec<f64>) -> (f64, usize) {
    let diffs: Vec<f64> = diffs
        .into_iter()
        .filter(|d| d.abs() > f64::EPSILON)
        .collect();
    let n = diffs.len();
    if n == 0 {
        return (1.0, 0);
    }

    let mut paired: Vec<(f64, f64)> = diffs.into_iter().map(|d| (d.abs(), d.signum())).collect();
    paired.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut ranks = Vec::with_capacity(n);
    let mut tie_sizes = Vec::new();
    let mut i = 0;
    while i < paired.len() {
        let mut j = i;
        while j + 1 < paired.len() && (paired[j + 1].0 - paired[i].0).abs() < 1e-12 {
            j += 1;
        }
        let rank = (i + j + 2) as f64 / 2.0;
        for item in &paired[i..=j] {
            ranks.push((rank, item.1));
        }
        if j > i {
            tie_sizes.push(j - i + 1);
        }
        i = j + 1;
    }

    let w_plus: f64 = ranks
        .iter()
        .filter(|(_, sign)| *sign > 0.0)
        .map(|(rank, _)| *rank)
        .sum();
    let w_minus: f64 = ranks
        .iter()
        .filter(|(_, sign)| *sign < 0.0)
        .map(|(rank, _)| *rank)
        .sum();

    let w = w_plus.min(w_minus);
    let n_f = n as f64;
    let mean_w = n_f * (n_f + 1.0) / 4.0;

    let tie_adjustment: f64 = tie_sizes
        .into_iter()
        .map(|count| {
            let c = count as f64;
            (c.powi(3) - c) / 48.0
        })
        .sum();
    let variance_w = n_f * (n_f + 1.0) * (2.0 * n_f + 1.0) / 24.0 - tie_adjustment;
    if variance_w <= 0.0 {
        return (1.0, n);
    }

    let z = (((w - mean_w).abs() - 0.5) / variance_w.sqrt()).max(0.0);
    let Ok(normal) = Normal::new(0.0, 1.0) else {
        return (1.0, n);
    };
    let p = 2.0 * (1.0 - normal.cdf(z));
    (p.clamp(0.0, 1.0), n)
}

fn confidence_interval(points: &[f64]) -> (f64, f64) {
    if points.is_empty() {
        return (0.0, 0.0);
    }
    let mean = points.iter().sum::<f64>() / points.len() as f64;
    if points.len() == 1 {
        return (mean, mean);
    }
    let variance = points
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / (points.len() as f64 - 1.0);
    let std_error = (variance / points.len() as f64).sqrt();
    let margin = CONFIDENCE_Z * std_error;
    (mean - margin, mean + margin)
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub baseline: String,
    pub groups: Vec<GroupReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupReport {
    pub agent: String,
    pub kind: AgentKind,
    pub players: u8,
    pub games: usize,
    pub wins: usize,
    pub win_rate: f64,
    pub avg_score: f64,
    pub ci95: (f64, f64),
    pub strike_outs: usize,
    pub avg_turns: f64,
    /// Games per final score, index 0 through 25.
    pub histogram: Vec<usize>,
    pub invariant_violations: usize,
    pub p_value: f64,
    pub paired_trials: usize,
    #[serde(skip)]
    pub delta_vs_baseline: f64,
}

impl AnalyticsSummary {
    pub fn enrich(mut self) -> Self {
        let baseline_avgs: HashMap<u8, f64> = self
            .groups
            .iter()
            .filter(|group| group.agent == self.baseline)
            .map(|group| (group.players, group.avg_score))
            .collect();

        for group in &mut self.groups {
            let baseline = baseline_avgs.get(&group.players).copied().unwrap_or(0.0);
            group.delta_vs_baseline = group.avg_score - baseline;
        }

        self
    }

    pub fn group(&self, agent: &str, players: u8) -> Option<&GroupReport> {
        self.groups
            .iter()
            .find(|group| group.agent == agent && group.players == players)
    }

    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        let mut rows = String::new();
        rows.push_str("# Trial Summary\n\n");
        rows.push_str(&format!("Baseline: `{}`\n\n", self.baseline));
        rows.push_str("| Agent | Kind | Players | Games | Win % | Avg score | Δ vs baseline | 95% CI | Strike-outs | Avg turns | Violations | p-value |\n");
        rows.push_str("|-------|------|---------|-------|-------|-----------|----------------|--------|-------------|-----------|------------|---------|\n");

        for group in &self.groups {
            rows.push_str(&format!(
                "| {agent} | {kind:?} | {players} | {games} | {win:.1}% | {avg:.3} | {delta:+.3} | [{ci_low:.3}, {ci_high:.3}] | {strikes} | {turns:.1} | {violations} | {pval:.3} |\n",
                agent = group.agent,
                kind = group.kind,
                players = group.players,
                games = group.games,
                win = group.win_rate * 100.0,
                avg = group.avg_score,
                delta = group.delta_vs_baseline,
                ci_low = group.ci95.0,
                ci_high = group.ci95.1,
                strikes = group.strike_outs,
                turns = group.avg_turns,
                violations = group.invariant_violations,
                pval = group.p_value,
            ));
        }

        rows.push_str("\n## Score Histograms\n\n");
        for group in &self.groups {
            let buckets = group
                .histogram
                .iter()
                .enumerate()
                .filter(|(_, count)| **count > 0)
                .map(|(score, count)| format!("{score}:{count}"))
                .collect::<Vec<_>>()
                .join(" ");
            rows.push_str(&format!(
                "- {} ({} players): {}\n",
                group.agent,
                group.players,
                if buckets.is_empty() { "<none>" } else { &buckets }
            ));
        }

        fs::write(path.as_ref(), rows).map_err(|e| AnalyticsError::Io {
            context: "writing summary markdown",
            source: e,
        })?;
        Ok(())
    }

    pub fn render_plot(&self, dir: impl AsRef<Path>) -> Result<PathBuf, AnalyticsError> {
        let dir = dir.as_ref();
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).map_err(|e| AnalyticsError::Io {
                context: "creating plots directory",
                source: e,
            })?;
        }

        let output_path = dir.join("avg_score.png");
        let baseline = self.baseline.clone();
        let groups = self.groups.clone();

        let prev_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(|_| {}));

        let plot_attempt = std::panic::catch_unwind(move || {
            let root = BitMapBackend::new(&output_path, (960, 480)).into_drawing_area();
            root.fill(&WHITE)
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            let mut chart = ChartBuilder::on(&root)
                .margin(20)
                .caption("Average score by agent and table size", ("sans-serif", 22))
                .set_label_area_size(LabelAreaPosition::Left, 50)
                .set_label_area_size(LabelAreaPosition::Bottom, 60)
                .build_cartesian_2d(0..groups.len() + 1, 0.0..(MAX_SCORE as f64 + 1.0))
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            chart
                .configure_mesh()
                .disable_mesh()
                .y_desc("Average score")
                .x_desc("Agent / players")
                .x_label_formatter(&|idx| {
                    groups
                        .get(*idx)
                        .map(|group| format!("{}/{}", group.agent, group.players))
                        .unwrap_or_default()
                })
                .draw()
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            chart
                .draw_series(groups.iter().enumerate().map(|(idx, group)| {
                    let color = if group.agent == baseline {
                        &BLUE
                    } else if group.delta_vs_baseline >= 0.0 {
                        &GREEN
                    } else {
                        &RED
                    };
                    Rectangle::new([(idx, 0.0), (idx + 1, group.avg_score)], color.filled())
                }))
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            drop(chart);

            root.present()
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            drop(root);

            Ok(output_path)
        });

        std::panic::set_hook(prev_hook);

        match plot_attempt {
            Ok(result) => result,
            Err(_) => Err(AnalyticsError::Plot(
                "plotters panicked while rendering (missing font support?)".into(),
            )),
        }
    }
}
