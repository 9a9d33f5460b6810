use hanabi_core::game::config::{
    DEFAULT_MAX_HINT_TOKENS, DEFAULT_MAX_STRIKES, GameConfig, default_hand_size,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root benchmark configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BenchmarkConfig {
    pub run_id: String,
    pub trials: TrialsConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    pub agents: Vec<AgentConfig>,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BenchmarkConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: BenchmarkConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.trials.validate()?;
        self.rules.validate(&self.trials.player_counts)?;
        self.outputs.validate(&self.run_id)?;
        self.metrics.validate(&self.agents)?;
        self.logging.validate()?;
        validate_agents(&mut self.agents)?;
        Ok(())
    }

    /// Resolve output templates (e.g., `{run_id}` placeholders) into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: resolve_template(&self.run_id, &self.outputs.jsonl),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
            plots_dir: resolve_template(&self.run_id, &self.outputs.plots_dir),
        }
    }
}

/// How many games to run per agent and table size.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TrialsConfig {
    pub count: usize,
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_player_counts")]
    pub player_counts: Vec<u8>,
}

impl TrialsConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.count == 0 {
            return Err(ValidationError::InvalidField {
                field: "trials.count".to_string(),
                message: "number of trials must be greater than zero".to_string(),
            });
        }

        if self.player_counts.is_empty() {
            return Err(ValidationError::InvalidField {
                field: "trials.player_counts".to_string(),
                message: "at least one player count must be listed".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for &count in &self.player_counts {
            if !seen.insert(count) {
                return Err(ValidationError::InvalidField {
                    field: "trials.player_counts".to_string(),
                    message: format!("player count {count} listed more than once"),
                });
            }
        }

        Ok(())
    }
}

fn default_player_counts() -> Vec<u8> {
    vec![2, 3, 4, 5]
}

/// Table rule overrides shared by every game in the run.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub struct RulesConfig {
    #[serde(default = "default_max_hint_tokens")]
    pub max_hint_tokens: u8,
    #[serde(default = "default_max_strikes")]
    pub max_strikes: u8,
    /// Falls back to the standard size for each table when unset.
    #[serde(default)]
    pub hand_size: Option<u8>,
    #[serde(default = "default_refill_hint_on_five")]
    pub refill_hint_on_five: bool,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            max_hint_tokens: DEFAULT_MAX_HINT_TOKENS,
            max_strikes: DEFAULT_MAX_STRIKES,
            hand_size: None,
            refill_hint_on_five: true,
        }
    }
}

impl RulesConfig {
    pub fn game_config(&self, player_count: u8) -> GameConfig {
        GameConfig::for_players(player_count)
            .with_max_hint_tokens(self.max_hint_tokens)
            .with_max_strikes(self.max_strikes)
            .with_hand_size(
                self.hand_size
                    .unwrap_or_else(|| default_hand_size(player_count)),
            )
            .with_refill_hint_on_five(self.refill_hint_on_five)
    }

    fn validate(&self, player_counts: &[u8]) -> Result<(), ValidationError> {
        for &players in player_counts {
            self.game_config(players)
                .validate()
                .map_err(|err| ValidationError::InvalidField {
                    field: "rules".to_string(),
                    message: format!("{players} players: {err}"),
                })?;
        }
        Ok(())
    }
}

fn default_max_hint_tokens() -> u8 {
    DEFAULT_MAX_HINT_TOKENS
}

fn default_max_strikes() -> u8 {
    DEFAULT_MAX_STRIKES
}

fn default_refill_hint_on_five() -> bool {
    true
}

/// Definition of a benchmark participant.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AgentConfig {
    pub name: String,
    pub kind: AgentKind,
    #[serde(default)]
    pub params: serde_yaml::Value,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Heuristic,
    Blind,
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
    pub plots_dir: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outputs.jsonl", &self.jsonl),
            ("outputs.summary_md", &self.summary_md),
            ("outputs.plots_dir", &self.plots_dir),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "path must not be empty".to_string(),
                });
            }

            let resolved = resolve_template(run_id, value);
            if resolved.components().count() == 0 {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "resolved path is invalid".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Metrics configuration block.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct MetricsConfig {
    #[serde(default)]
    pub baseline: Option<String>,
}

impl MetricsConfig {
    fn validate(&self, agents: &[AgentConfig]) -> Result<(), ValidationError> {
        let Some(baseline) = self.baseline.as_ref() else {
            return Err(ValidationError::InvalidField {
                field: "metrics.baseline".to_string(),
                message: "baseline agent must be specified".to_string(),
            });
        };

        if !agents.iter().any(|a| &a.name == baseline) {
            return Err(ValidationError::InvalidField {
                field: "metrics.baseline".to_string(),
                message: format!("baseline agent '{baseline}' is not defined in agents list"),
            });
        }

        Ok(())
    }
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
    /// Embed the full turn-by-turn record in every JSONL row.
    #[serde(default)]
    pub record_turns: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
            record_turns: false,
        }
    }
}

impl LoggingConfig {
    fn validate(&mut self) -> Result<(), ValidationError> {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
        if self.level().is_none() {
            return Err(ValidationError::InvalidField {
                field: "logging.tracing_level".to_string(),
                message: format!(
                    "unknown level '{}'; expected trace, debug, info, warn or error",
                    self.tracing_level
                ),
            });
        }
        Ok(())
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id must not be empty".to_string(),
        });
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id may only contain alphanumeric characters, '.', '_' or '-'".to_string(),
        });
    }

    Ok(())
}

fn validate_agents(agents: &mut [AgentConfig]) -> Result<(), ValidationError> {
    if agents.is_empty() {
        return Err(ValidationError::InvalidField {
            field: "agents".to_string(),
            message: "at least one agent must be specified".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for agent in agents.iter_mut() {
        if agent.name.trim().is_empty() {
            return Err(ValidationError::InvalidField {
                field: "agents.name".to_string(),
                message: "agent name must not be empty".to_string(),
            });
        }

        if !agent.name.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
            return Err(ValidationError::InvalidField {
                field: format!("agents[{}].name", agent.name),
                message: "agent name contains invalid characters".to_string(),
            });
        }

        if !seen.insert(agent.name.clone()) {
            return Err(ValidationError::InvalidField {
                field: "agents".to_string(),
                message: format!("agent name '{}' defined more than once", agent.name),
            });
        }

        if agent.params.is_null() {
            agent.params = serde_yaml::Value::Mapping(Default::default());
        }
    }

    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    PathBuf::from(template.replace("{run_id}", run_id))
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
    pub plots_dir: PathBuf,
}

impl ResolvedOutputs {
    /// Directory that receives the telemetry log and its summaries.
    pub fn telemetry_dir(&self) -> PathBuf {
        self.summary_md
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC_YAML: &str = r#"
run_id: "omniscient_smoke"
trials:
  count: 16
  seed: 123
  player_counts: [2, 4]
agents:
  - name: "refined"
    kind: "heuristic"
    params:
      level: "refined"
  - name: "blind"
    kind: "blind"
outputs:
  jsonl: "bench/out/{run_id}/trials.jsonl"
  summary_md: "bench/out/{run_id}/summary.md"
  plots_dir: "bench/out/{run_id}/plots"
metrics:
  baseline: "refined"
logging:
  enable_structured: true
  tracing_level: "debug"
"#;

    fn field_of(err: ValidationError) -> String {
        match err {
            ValidationError::InvalidField { field, .. } => field,
        }
    }

    #[test]
    fn loads_and_validates_basic_config() {
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(BASIC_YAML).expect("parse yaml");
        cfg.validate().expect("validate");

        assert_eq!(cfg.rules, RulesConfig::default());
        assert!(cfg.logging.enable_structured);
        assert!(!cfg.logging.record_turns);
        assert_eq!(cfg.logging.level(), Some(Level::DEBUG));
        assert!(cfg.agents[1].params.is_mapping());

        let outputs = cfg.resolved_outputs();
        assert_eq!(
            outputs.jsonl,
            PathBuf::from("bench/out/omniscient_smoke/trials.jsonl")
        );
        assert_eq!(
            outputs.telemetry_dir(),
            PathBuf::from("bench/out/omniscient_smoke")
        );
    }

    #[test]
    fn rules_fall_back_to_standard_hand_sizes() {
        let rules = RulesConfig {
            refill_hint_on_five: false,
            ..RulesConfig::default()
        };
        assert_eq!(rules.game_config(3).hand_size, 5);
        assert_eq!(rules.game_config(5).hand_size, 4);
        assert!(!rules.game_config(2).refill_hint_on_five);

        let fixed = RulesConfig {
            hand_size: Some(3),
            ..RulesConfig::default()
        };
        assert_eq!(fixed.game_config(5).hand_size, 3);
    }

    #[test]
    fn rejects_missing_baseline() {
        let yaml = BASIC_YAML.replace("baseline: \"refined\"\n", "");
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("should fail");
        assert_eq!(field_of(err), "metrics.baseline");
    }

    #[test]
    fn rejects_duplicate_agents() {
        let yaml = BASIC_YAML.replace("name: \"blind\"", "name: \"refined\"");
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("duplicate agents should fail");
        assert_eq!(field_of(err), "agents");
    }

    #[test]
    fn rejects_invalid_run_id() {
        let yaml = BASIC_YAML.replace("omniscient_smoke", "omniscient smoke");
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("invalid run id");
        assert_eq!(field_of(err), "run_id");
    }

    #[test]
    fn rejects_unsupported_player_counts() {
        let yaml = BASIC_YAML.replace("player_counts: [2, 4]", "player_counts: [2, 6]");
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("six players is out of range");
        assert_eq!(field_of(err), "rules");

        let yaml = BASIC_YAML.replace("player_counts: [2, 4]", "player_counts: [3, 3]");
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("duplicate counts");
        assert_eq!(field_of(err), "trials.player_counts");
    }

    #[test]
    fn rejects_rules_that_break_the_deal() {
        let yaml = BASIC_YAML.replace(
            "agents:",
            "rules:\n  max_strikes: 0\nagents:",
        );
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("zero strikes");
        assert_eq!(field_of(err), "rules");
    }

    #[test]
    fn rejects_zero_trials() {
        let yaml = BASIC_YAML.replace("count: 16", "count: 0");
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("parse");
        assert_eq!(field_of(cfg.validate().unwrap_err()), "trials.count");
    }

    #[test]
    fn rejects_unknown_tracing_level() {
        let yaml = BASIC_YAML.replace("tracing_level: \"debug\"", "tracing_level: \"verbose\"");
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("verbose is not a level");
        assert_eq!(field_of(err), "logging.tracing_level");

        let yaml = BASIC_YAML.replace("tracing_level: \"debug\"", "tracing_level: \" WARN \"");
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("parse");
        cfg.validate().expect("levels ignore case and padding");
        assert_eq!(cfg.logging.level(), Some(Level::WARN));
    }
}
