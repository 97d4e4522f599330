//! Logical time for the simulation
//!
//! Time is a non-decreasing `f64` starting at 0 and bounded by a horizon.
//! Nothing here relates to wall-clock time.

use serde::{Deserialize, Serialize};

/// Manages logical simulation time up to a fixed horizon
///
/// # Example
/// ```
/// use channel_petri_sim::SimClock;
///
/// let mut clock = SimClock::new(100.0);
/// assert_eq!(clock.now(), 0.0);
///
/// clock.advance_to(12.5);
/// assert_eq!(clock.now(), 12.5);
/// assert!(!clock.reached_horizon());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimClock {
    /// Current logical time
    now: f64,
    /// End of the run (exclusive for event processing)
    horizon: f64,
}

impl SimClock {
    /// Create a new clock at time 0
    ///
    /// # Panics
    /// Panics if the horizon is not a finite positive number. The engine
    /// validates the horizon before building a clock.
    pub fn new(horizon: f64) -> Self {
        assert!(
            horizon.is_finite() && horizon > 0.0,
            "horizon must be finite and positive"
        );
        Self { now: 0.0, horizon }
    }

    /// Move the clock forward to `time`
    ///
    /// # Panics
    /// Panics if `time` lies in the past. Scheduled outputs are never
    /// earlier than the instant they were scheduled at, so this only
    /// fires on an engine bug.
    pub fn advance_to(&mut self, time: f64) {
        assert!(
            time >= self.now,
            "time must be monotonic: {} -> {}",
            self.now,
            time
        );
        self.now = time;
    }

    /// Jump to the horizon (used when the run is finalised)
    pub fn finish(&mut self) {
        if self.horizon > self.now {
            self.now = self.horizon;
        }
    }

    /// Current logical time
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Configured horizon
    pub fn horizon(&self) -> f64 {
        self.horizon
    }

    /// True if an event at `time` falls inside the run
    pub fn within_horizon(&self, time: f64) -> bool {
        time < self.horizon
    }

    /// True once the clock has been moved to the horizon
    pub fn reached_horizon(&self) -> bool {
        self.now >= self.horizon
    }
}
