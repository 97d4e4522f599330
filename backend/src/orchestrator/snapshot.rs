//! Snapshots - run outputs handed to the reporting layer
//!
//! The engine produces two structured outputs: the final marking with its
//! per-position statistics, and whatever the observer recorded. This module
//! holds the first, plus the fingerprint used to tie a report to the
//! network it came from.
//!
//! # Critical Invariants
//!
//! - **Ordering**: positions appear in configuration order
//! - **Fingerprint**: equal networks hash equally regardless of map ordering

use crate::models::position::Position;
use crate::orchestrator::config::ConfigError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Statistics of one position at the time the snapshot was taken
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub name: String,
    pub tokens: u64,
    pub total_inflow: u64,
    pub max_tokens: u64,
    pub total_busy_time: f64,
}

impl From<&Position> for PositionSnapshot {
    fn from(position: &Position) -> Self {
        Self {
            name: position.name().to_string(),
            tokens: position.tokens(),
            total_inflow: position.total_inflow(),
            max_tokens: position.max_tokens(),
            total_busy_time: position.total_busy_time(),
        }
    }
}

/// Marking of the whole net
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkingSnapshot {
    pub positions: Vec<PositionSnapshot>,
}

impl MarkingSnapshot {
    pub fn capture(marking: &[Position]) -> Self {
        Self {
            positions: marking.iter().map(PositionSnapshot::from).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&PositionSnapshot> {
        self.positions.iter().find(|p| p.name == name)
    }

    /// Token count of `name`, 0 if the position does not exist
    pub fn tokens(&self, name: &str) -> u64 {
        self.get(name).map(|p| p.tokens).unwrap_or(0)
    }

    /// Sum of tokens over all positions
    pub fn total_tokens(&self) -> u64 {
        self.positions.iter().map(|p| p.tokens).sum()
    }
}

/// Summary of a completed run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Logical time the run ended at (the horizon)
    pub final_time: f64,
    pub horizon: f64,

    /// Loop iterations (time advances, including the initial firing phase)
    pub iterations: u64,

    /// Input firings over the whole run
    pub firings: u64,

    /// Outputs applied over the whole run
    pub completions: u64,

    /// Outputs still scheduled at or beyond the horizon
    pub in_flight: u64,

    /// Fingerprint of the network that produced the run
    pub fingerprint: String,

    pub marking: MarkingSnapshot,
}

/// Compute a SHA-256 fingerprint of any serializable configuration
///
/// The config is routed through `serde_json::Value`, whose object map keeps
/// keys sorted, so the hash does not depend on field or map order.
pub fn compute_fingerprint<T: Serialize>(config: &T) -> Result<String, ConfigError> {
    let canonical = serde_json::to_value(config)
        .and_then(|value| serde_json::to_vec(&value))
        .map_err(|e| ConfigError::Serialization(format!("Config serialization failed: {}", e)))?;

    Ok(format!("{:x}", Sha256::digest(&canonical)))
}
