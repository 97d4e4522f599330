//! Event logging for replay checks and analysis.
//!
//! The engine records one event per firing (input phase) and one per
//! applied output, in the exact order it processed them. Two runs with the
//! same network, marking and random stream produce identical logs.
//!
//! # Example
//!
//! ```rust
//! use channel_petri_sim::models::{Event, EventLog};
//!
//! let mut log = EventLog::new();
//! log.log(Event::Fired {
//!     time: 0.0,
//!     transition: "T1".to_string(),
//!     output_time: 9.4,
//! });
//! log.log(Event::Completed {
//!     time: 9.4,
//!     transition: "T1".to_string(),
//! });
//!
//! assert_eq!(log.firing_times("T1"), vec![0.0]);
//! ```

use serde::{Deserialize, Serialize};

/// Simulation event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// Transition consumed its inputs and scheduled an output
    Fired {
        time: f64,
        transition: String,
        output_time: f64,
    },

    /// A scheduled output was applied
    Completed { time: f64, transition: String },
}

impl Event {
    /// Time the event was processed at
    pub fn time(&self) -> f64 {
        match self {
            Event::Fired { time, .. } => *time,
            Event::Completed { time, .. } => *time,
        }
    }

    /// Name of the transition involved
    pub fn transition(&self) -> &str {
        match self {
            Event::Fired { transition, .. } => transition,
            Event::Completed { transition, .. } => transition,
        }
    }

    /// Get event type as string
    pub fn event_type(&self) -> &str {
        match self {
            Event::Fired { .. } => "Fired",
            Event::Completed { .. } => "Completed",
        }
    }
}

/// Event log for storing and querying simulation events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Add an event to the log
    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// (time, transition) for every firing, in firing order
    pub fn fired(&self) -> Vec<(f64, &str)> {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::Fired { .. }))
            .map(|e| (e.time(), e.transition()))
            .collect()
    }

    /// Events involving one transition
    pub fn events_for(&self, transition: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.transition() == transition)
            .collect()
    }

    /// Instants at which `transition` fired
    pub fn firing_times(&self, transition: &str) -> Vec<f64> {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::Fired { .. }) && e.transition() == transition)
            .map(Event::time)
            .collect()
    }

    /// Events processed at exactly `time`
    pub fn events_at(&self, time: f64) -> Vec<&Event> {
        self.events.iter().filter(|e| e.time() == time).collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
