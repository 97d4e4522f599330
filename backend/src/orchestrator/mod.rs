//! Orchestrator - the engine that executes a net over logical time
//!
//! See `engine.rs` for the main loop.

pub mod config;
pub mod engine;
pub mod observer;
pub mod snapshot;

// Re-export main types for convenience
pub use config::{
    ConfigError, EngineConfig, InputArcConfig, NetworkConfig, OutputArcConfig, PositionConfig,
    TransitionConfig,
};
pub use engine::{Engine, SimulationError, StepOutcome};
pub use observer::{NoopObserver, ObserverHandle, TransitionObserver};
pub use snapshot::{compute_fingerprint, MarkingSnapshot, PositionSnapshot, RunReport};
