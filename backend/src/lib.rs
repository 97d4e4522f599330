//! Channel Petri-Net Simulator - Rust Engine
//!
//! Discrete-event execution of generalized Petri nets with timed
//! transitions, used to model a communication channel with a main and a
//! reserve transmission path.
//!
//! # Architecture
//!
//! - **core**: Logical time
//! - **models**: Net elements (Position, Transition, delays, event log)
//! - **orchestrator**: Configuration, the engine loop, observers, snapshots
//! - **rng**: Deterministic random number generation
//! - **statistics**: Transmission records and run metrics
//! - **channel**: The main/reserve channel network and its observer
//!
//! # Critical Invariants
//!
//! 1. Token counts never go negative; a firing that would break this aborts the run
//! 2. All randomness is deterministic (seeded RNG owned by each engine)
//! 3. Every output due at an instant is applied before anything fires at it

// Module declarations
pub mod channel;
pub mod core;
pub mod models;
pub mod orchestrator;
pub mod rng;
pub mod statistics;

// Re-exports for convenience
pub use crate::core::time::SimClock;
pub use models::{
    delay::DelayDistribution,
    event::{Event, EventLog},
    position::{Position, PositionError},
    transition::{ArcKind, Transition},
};
pub use orchestrator::{
    ConfigError, Engine, EngineConfig, MarkingSnapshot, NetworkConfig, NoopObserver,
    ObserverHandle, RunReport, SimulationError, StepOutcome, TransitionConfig, TransitionObserver,
};
pub use rng::RngManager;
pub use statistics::{ChannelStatistics, RecordLog, TransmissionRecord, TransmissionStats};
