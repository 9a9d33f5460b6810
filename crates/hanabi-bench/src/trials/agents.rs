use hanabi_bot::{BlindPolicy, HeuristicPolicy, Policy, PolicyLevel};
use thiserror::Error;

use crate::config::{AgentConfig, AgentKind};

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid heuristic parameter for agent '{name}': {message}")]
    InvalidHeuristicParam { name: String, message: String },
    #[error("invalid blind parameter for agent '{name}': {message}")]
    InvalidBlindParam { name: String, message: String },
}

/// A configured agent that can spawn a fresh policy for every trial.
#[derive(Debug, Clone)]
pub struct AgentBlueprint {
    pub name: String,
    pub kind: AgentKind,
    implementation: AgentImplementation,
}

#[derive(Debug, Clone, Copy)]
enum AgentImplementation {
    Heuristic(PolicyLevel),
    Blind { play_threshold: f64 },
}

impl AgentBlueprint {
    pub fn from_configs(configs: &[AgentConfig]) -> Result<Vec<Self>, AgentError> {
        configs.iter().map(Self::from_config).collect()
    }

    pub fn from_config(config: &AgentConfig) -> Result<Self, AgentError> {
        let implementation = match config.kind {
            AgentKind::Heuristic => {
                AgentImplementation::Heuristic(heuristic_level(&config.name, &config.params)?)
            }
            AgentKind::Blind => AgentImplementation::Blind {
                play_threshold: blind_threshold(&config.name, &config.params)?,
            },
        };

        Ok(Self {
            name: config.name.clone(),
            kind: config.kind.clone(),
            implementation,
        })
    }

    pub fn spawn_policy(&self) -> Box<dyn Policy> {
        match self.implementation {
            AgentImplementation::Heuristic(level) => Box::new(HeuristicPolicy::new(level)),
            AgentImplementation::Blind { play_threshold } => {
                Box::new(BlindPolicy::new(play_threshold))
            }
        }
    }
}

fn param<'a>(params: &'a serde_yaml::Value, key: &str) -> Option<&'a serde_yaml::Value> {
    params
        .as_mapping()?
        .iter()
        .find_map(|(k, value)| (k.as_str() == Some(key)).then_some(value))
}

fn heuristic_level(name: &str, params: &serde_yaml::Value) -> Result<PolicyLevel, AgentError> {
    if !params.is_null() && !params.is_mapping() {
        return Err(AgentError::InvalidHeuristicParam {
            name: name.to_string(),
            message: "expected mapping for heuristic params".to_string(),
        });
    }

    let Some(value) = param(params, "level") else {
        return Ok(PolicyLevel::default());
    };
    let text = value
        .as_str()
        .ok_or_else(|| AgentError::InvalidHeuristicParam {
            name: name.to_string(),
            message: "level must be a string".to_string(),
        })?;

    match text.to_ascii_lowercase().as_str() {
        "naive" | "basic" => Ok(PolicyLevel::Naive),
        "refined" | "default" => Ok(PolicyLevel::Refined),
        other => Err(AgentError::InvalidHeuristicParam {
            name: name.to_string(),
            message: format!("unknown level '{other}'"),
        }),
    }
}

fn blind_threshold(name: &str, params: &serde_yaml::Value) -> Result<f64, AgentError> {
    let default = BlindPolicy::default().play_threshold();
    let Some(value) = param(params, "play_threshold") else {
        return Ok(default);
    };
    let threshold = value
        .as_f64()
        .ok_or_else(|| AgentError::InvalidBlindParam {
            name: name.to_string(),
            message: "play_threshold must be a number".to_string(),
        })?;
    if !(0.0..=1.0).contains(&threshold) {
        return Err(AgentError::InvalidBlindParam {
            name: name.to_string(),
            message: format!("play_threshold {threshold} outside [0, 1]"),
        });
    }
    Ok(threshold)
}
