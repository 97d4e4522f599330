//! Net elements: positions, transitions, delays and the event log

pub mod delay;
pub mod event;
pub mod position;
pub mod transition;

// Re-exports
pub use delay::DelayDistribution;
pub use event::{Event, EventLog};
pub use position::{Position, PositionError};
pub use transition::{ArcKind, InputArc, OutputArc, PendingOutput, Transition};
