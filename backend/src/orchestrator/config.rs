//! Network and run configuration
//!
//! A network is described as plain data (serde-friendly) and validated as a
//! whole when the engine is built. Counts and weights are signed here so
//! that negative values coming from a config file are reported as
//! configuration errors rather than parse failures.
//!
//! # Example
//!
//! ```
//! use channel_petri_sim::orchestrator::{NetworkConfig, TransitionConfig};
//! use channel_petri_sim::DelayDistribution;
//!
//! let network = NetworkConfig::new()
//!     .position("A", 1)
//!     .position("B", 0)
//!     .transition(
//!         TransitionConfig::new("move")
//!             .input("A", 1)
//!             .output("B", 1)
//!             .delay(DelayDistribution::Fixed { value: 2.0 }),
//!     );
//!
//! assert!(network.validate().is_ok());
//! ```

use crate::models::delay::DelayDistribution;
use crate::models::transition::ArcKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Problems found while validating a configuration
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Transition '{transition}' references unknown position '{position}'")]
    UnknownPosition {
        transition: String,
        position: String,
    },

    #[error("Position '{position}' has negative initial token count {tokens}")]
    NegativeInitialTokens { position: String, tokens: i64 },

    #[error("Arc between transition '{transition}' and position '{position}' has negative weight {weight}")]
    NegativeArcWeight {
        transition: String,
        position: String,
        weight: i64,
    },

    #[error("Output arc from transition '{transition}' to position '{position}' must have positive weight")]
    ZeroOutputWeight {
        transition: String,
        position: String,
    },

    #[error("Inhibitor arc from position '{position}' to transition '{transition}' must have positive weight")]
    ZeroInhibitorWeight {
        transition: String,
        position: String,
    },

    #[error("Transition '{transition}' has more than one {direction} arc for position '{position}'")]
    DuplicateArc {
        transition: String,
        position: String,
        direction: &'static str,
    },

    #[error("Duplicate position name: {0}")]
    DuplicatePosition(String),

    #[error("Duplicate transition name: {0}")]
    DuplicateTransition(String),

    #[error("Invalid delay for transition '{transition}': {reason}")]
    InvalidDelay { transition: String, reason: String },

    #[error("Horizon must be finite and positive, got {0}")]
    InvalidHorizon(f64),

    #[error("max_firings_per_instant must be > 0")]
    ZeroFiringBound,

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// A position and its starting token count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionConfig {
    pub name: String,
    #[serde(default)]
    pub initial_tokens: i64,
}

/// Input arc: position → transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputArcConfig {
    pub position: String,
    pub weight: i64,
    #[serde(default)]
    pub kind: ArcKind,
}

/// Output arc: transition → position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputArcConfig {
    pub position: String,
    pub weight: i64,
}

/// Transition definition
///
/// Higher `priority` is more urgent. A missing delay means the transition
/// is immediate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionConfig {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<InputArcConfig>,
    #[serde(default)]
    pub outputs: Vec<OutputArcConfig>,
    #[serde(default)]
    pub delay: DelayDistribution,
    #[serde(default)]
    pub priority: i32,
}

impl TransitionConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            delay: DelayDistribution::Immediate,
            priority: 0,
        }
    }

    /// Consuming input arc
    pub fn input(self, position: impl Into<String>, weight: i64) -> Self {
        self.arc(position, weight, ArcKind::Consume)
    }

    /// Read-only input arc
    pub fn guard(self, position: impl Into<String>, weight: i64) -> Self {
        self.arc(position, weight, ArcKind::Guard)
    }

    /// Input arc that blocks while the position holds `weight` or more tokens
    pub fn inhibitor(self, position: impl Into<String>, weight: i64) -> Self {
        self.arc(position, weight, ArcKind::Inhibitor)
    }

    pub fn arc(mut self, position: impl Into<String>, weight: i64, kind: ArcKind) -> Self {
        self.inputs.push(InputArcConfig {
            position: position.into(),
            weight,
            kind,
        });
        self
    }

    pub fn output(mut self, position: impl Into<String>, weight: i64) -> Self {
        self.outputs.push(OutputArcConfig {
            position: position.into(),
            weight,
        });
        self
    }

    pub fn delay(mut self, delay: DelayDistribution) -> Self {
        self.delay = delay;
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// Complete net topology plus initial marking
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub positions: Vec<PositionConfig>,
    pub transitions: Vec<TransitionConfig>,
}

impl NetworkConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a position with its initial token count
    pub fn position(mut self, name: impl Into<String>, initial_tokens: i64) -> Self {
        self.positions.push(PositionConfig {
            name: name.into(),
            initial_tokens,
        });
        self
    }

    pub fn transition(mut self, transition: TransitionConfig) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Parse a network from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Serialization(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialization(e.to_string()))
    }

    /// Hex SHA-256 of the canonical JSON form of this network
    pub fn fingerprint(&self) -> Result<String, ConfigError> {
        crate::orchestrator::snapshot::compute_fingerprint(self)
    }

    /// Check the whole configuration, reporting the first problem found
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut names = HashSet::new();
        for position in &self.positions {
            if !names.insert(position.name.as_str()) {
                return Err(ConfigError::DuplicatePosition(position.name.clone()));
            }
            if position.initial_tokens < 0 {
                return Err(ConfigError::NegativeInitialTokens {
                    position: position.name.clone(),
                    tokens: position.initial_tokens,
                });
            }
        }

        let mut transition_names = HashSet::new();
        for transition in &self.transitions {
            if !transition_names.insert(transition.name.as_str()) {
                return Err(ConfigError::DuplicateTransition(transition.name.clone()));
            }
            validate_transition(transition, &names)?;
        }

        Ok(())
    }
}

fn validate_transition(
    transition: &TransitionConfig,
    positions: &HashSet<&str>,
) -> Result<(), ConfigError> {
    let known = |position: &str| {
        if positions.contains(position) {
            Ok(())
        } else {
            Err(ConfigError::UnknownPosition {
                transition: transition.name.clone(),
                position: position.to_string(),
            })
        }
    };
    let non_negative = |position: &str, weight: i64| {
        if weight < 0 {
            Err(ConfigError::NegativeArcWeight {
                transition: transition.name.clone(),
                position: position.to_string(),
                weight,
            })
        } else {
            Ok(())
        }
    };

    let mut seen = HashSet::new();
    for arc in &transition.inputs {
        known(&arc.position)?;
        non_negative(&arc.position, arc.weight)?;
        if arc.kind == ArcKind::Inhibitor && arc.weight == 0 {
            return Err(ConfigError::ZeroInhibitorWeight {
                transition: transition.name.clone(),
                position: arc.position.clone(),
            });
        }
        if !seen.insert(arc.position.as_str()) {
            return Err(ConfigError::DuplicateArc {
                transition: transition.name.clone(),
                position: arc.position.clone(),
                direction: "input",
            });
        }
    }

    let mut seen = HashSet::new();
    for arc in &transition.outputs {
        known(&arc.position)?;
        non_negative(&arc.position, arc.weight)?;
        if arc.weight == 0 {
            return Err(ConfigError::ZeroOutputWeight {
                transition: transition.name.clone(),
                position: arc.position.clone(),
            });
        }
        if !seen.insert(arc.position.as_str()) {
            return Err(ConfigError::DuplicateArc {
                transition: transition.name.clone(),
                position: arc.position.clone(),
                direction: "output",
            });
        }
    }

    transition
        .delay
        .validate()
        .map_err(|reason| ConfigError::InvalidDelay {
            transition: transition.name.clone(),
            reason,
        })
}

/// Run parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Logical time at which the run ends; events at or after it are not processed
    pub horizon: f64,

    /// Seed for the engine's own random stream
    pub rng_seed: u64,

    /// Upper bound on firings at a single instant before the run is
    /// declared non-convergent
    #[serde(default = "default_max_firings_per_instant")]
    pub max_firings_per_instant: usize,

    /// Keep a full event log (disable for long runs)
    #[serde(default = "default_record_events")]
    pub record_events: bool,
}

fn default_max_firings_per_instant() -> usize {
    100_000
}

fn default_record_events() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            horizon: 1000.0,
            rng_seed: 0,
            max_firings_per_instant: default_max_firings_per_instant(),
            record_events: default_record_events(),
        }
    }
}

impl EngineConfig {
    /// Default settings with the given horizon and seed
    pub fn new(horizon: f64, rng_seed: u64) -> Self {
        Self {
            horizon,
            rng_seed,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.horizon.is_finite() && self.horizon > 0.0) {
            return Err(ConfigError::InvalidHorizon(self.horizon));
        }
        if self.max_firings_per_instant == 0 {
            return Err(ConfigError::ZeroFiringBound);
        }
        Ok(())
    }
}
