//! Firing delay distributions
//!
//! Every transition samples its delay from one of these when it fires.
//! Samples are clamped to zero instead of being rejected, so `Normal` is
//! effectively a zero-clamped Gaussian.

use crate::rng::RngManager;
use serde::{Deserialize, Serialize};

/// Distribution a transition draws its firing delay from
///
/// # Example
/// ```
/// use channel_petri_sim::{DelayDistribution, RngManager};
///
/// let mut rng = RngManager::new(1);
/// let service = DelayDistribution::Normal { mean: 7.0, std_dev: 3.0 };
/// assert!(service.sample(&mut rng) >= 0.0);
/// assert_eq!(DelayDistribution::Immediate.sample(&mut rng), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DelayDistribution {
    /// Zero delay: output is applied at the firing instant
    #[default]
    Immediate,

    /// Constant delay
    Fixed { value: f64 },

    /// Gaussian with mean and standard deviation, negative samples become 0
    Normal { mean: f64, std_dev: f64 },

    /// Uniform on [min, max)
    Uniform { min: f64, max: f64 },

    /// Exponential with the given mean
    Exponential { mean: f64 },
}

impl DelayDistribution {
    /// Draw one delay, never negative
    ///
    /// `Immediate` and `Fixed` do not consume randomness.
    pub fn sample(&self, rng: &mut RngManager) -> f64 {
        let raw = match self {
            DelayDistribution::Immediate => 0.0,
            DelayDistribution::Fixed { value } => *value,
            DelayDistribution::Normal { mean, std_dev } => mean + std_dev * rng.standard_normal(),
            DelayDistribution::Uniform { min, max } => min + (max - min) * rng.next_f64(),
            DelayDistribution::Exponential { mean } => -mean * (1.0 - rng.next_f64()).ln(),
        };
        raw.max(0.0)
    }

    /// True when every sample is exactly zero
    pub fn is_immediate(&self) -> bool {
        match self {
            DelayDistribution::Immediate => true,
            DelayDistribution::Fixed { value } => *value <= 0.0,
            _ => false,
        }
    }

    /// Check the parameters, returning a description of the first problem
    pub fn validate(&self) -> Result<(), String> {
        let finite = |label: &str, v: f64| {
            if v.is_finite() {
                Ok(())
            } else {
                Err(format!("{} must be finite, got {}", label, v))
            }
        };

        match self {
            DelayDistribution::Immediate => Ok(()),
            DelayDistribution::Fixed { value } => finite("value", *value),
            DelayDistribution::Normal { mean, std_dev } => {
                finite("mean", *mean)?;
                finite("std_dev", *std_dev)?;
                if *std_dev < 0.0 {
                    return Err(format!("std_dev must be >= 0, got {}", std_dev));
                }
                Ok(())
            }
            DelayDistribution::Uniform { min, max } => {
                finite("min", *min)?;
                finite("max", *max)?;
                if min > max {
                    return Err(format!("min ({}) must not exceed max ({})", min, max));
                }
                Ok(())
            }
            DelayDistribution::Exponential { mean } => {
                finite("mean", *mean)?;
                if *mean <= 0.0 {
                    return Err(format!("mean must be > 0, got {}", mean));
                }
                Ok(())
            }
        }
    }
}
