//! Engine - the discrete-event loop driving the net
//!
//! # Architecture
//!
//! ```text
//! t = 0: firing phase (initially enabled transitions fire at time 0)
//! loop:
//! 1. t_next = earliest pending output over all transitions
//! 2. stop if there is none or t_next >= horizon
//! 3. advance the clock to t_next
//! 4. output phase: apply every output due at t_next
//! 5. firing phase: fire the best enabled transition until none is enabled
//! finally: settle every position's busy time to the horizon
//! ```
//!
//! Outputs scheduled for the current instant by step 5 (immediate
//! transitions) are applied by the next iteration's output phase at the
//! same time. The number of firings at one instant is bounded by
//! `EngineConfig::max_firings_per_instant`; exceeding it means the net
//! contains an immediate cycle that never disables itself.
//!
//! # Selection
//!
//! Transitions are pre-sorted by (priority descending, name ascending).
//! The first locally enabled transition in that order is exactly the
//! highest-priority enabled one: nothing above it is locally enabled, so it
//! cannot be pre-empted.
//!
//! # Example
//!
//! ```rust
//! use channel_petri_sim::orchestrator::{Engine, EngineConfig, NetworkConfig, TransitionConfig};
//! use channel_petri_sim::DelayDistribution;
//!
//! let network = NetworkConfig::new().position("P", 1).transition(
//!     TransitionConfig::new("tick")
//!         .input("P", 1)
//!         .output("P", 1)
//!         .delay(DelayDistribution::Fixed { value: 5.0 }),
//! );
//!
//! let mut engine = Engine::new(network, EngineConfig::new(17.0, 1)).unwrap();
//! let report = engine.run().unwrap();
//!
//! assert_eq!(engine.event_log().firing_times("tick"), vec![0.0, 5.0, 10.0, 15.0]);
//! assert_eq!(report.final_time, 17.0);
//! ```

use crate::core::time::SimClock;
use crate::models::event::{Event, EventLog};
use crate::models::position::{Position, PositionError};
use crate::models::transition::{ArcKind, InputArc, OutputArc, Transition};
use crate::orchestrator::config::{ConfigError, EngineConfig, NetworkConfig};
use crate::orchestrator::observer::{NoopObserver, TransitionObserver};
use crate::orchestrator::snapshot::{MarkingSnapshot, RunReport};
use crate::rng::RngManager;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

/// Simulation error types
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SimulationError {
    #[error("Invalid config: {0}")]
    Config(#[from] ConfigError),

    /// Enabling and firing disagreed about the marking
    #[error("Invariant violation at t={time} while firing '{transition}': {source}")]
    InvariantViolation {
        time: f64,
        transition: String,
        #[source]
        source: PositionError,
    },

    /// Producing a firing's outputs would overflow a token counter
    #[error("Token overflow at t={time} while completing '{transition}': {source}")]
    TokenOverflow {
        time: f64,
        transition: String,
        #[source]
        source: PositionError,
    },

    /// The firing phase kept finding enabled transitions at one instant
    #[error("Firing did not converge at t={time}: {firings} firings, last was '{last_transition}'")]
    NonConvergent {
        time: f64,
        firings: usize,
        last_transition: String,
    },

    #[error("Transition not found: {0}")]
    UnknownTransition(String),
}

/// What a single call to [`Engine::step`] did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// Time is now `time`; `outputs` were applied and `firings` happened
    Advanced {
        time: f64,
        outputs: usize,
        firings: usize,
    },

    /// Horizon reached or no events left; statistics are settled
    Finished,
}

/// Petri-net execution engine
///
/// Owns the marking, the transitions with their scheduled outputs, the
/// logical clock, the random stream used for delays and the observer.
///
/// # Determinism
///
/// All randomness comes from the engine's own `RngManager`. Same network +
/// same seed = identical event log.
pub struct Engine<O: TransitionObserver = NoopObserver> {
    positions: Vec<Position>,
    position_index: HashMap<String, usize>,

    transitions: Vec<Transition>,
    transition_index: HashMap<String, usize>,

    /// Transition indices by (priority desc, name asc)
    firing_order: Vec<usize>,

    clock: SimClock,
    rng: RngManager,
    observer: O,
    event_log: EventLog,
    config: EngineConfig,
    fingerprint: String,

    started: bool,
    finished: bool,
    iterations: u64,
    firings: u64,
    completions: u64,

    /// Firings since the clock last moved forward
    firings_this_instant: usize,
}

impl Engine<NoopObserver> {
    /// Build an engine without side-effect hooks
    pub fn new(network: NetworkConfig, config: EngineConfig) -> Result<Self, SimulationError> {
        Self::with_observer(network, config, NoopObserver)
    }
}

impl<O: TransitionObserver> Engine<O> {
    /// Build an engine seeded from `config.rng_seed`
    pub fn with_observer(
        network: NetworkConfig,
        config: EngineConfig,
        observer: O,
    ) -> Result<Self, SimulationError> {
        let rng = RngManager::new(config.rng_seed);
        Self::with_rng(network, config, observer, rng)
    }

    /// Build an engine drawing delays from a caller-supplied stream
    ///
    /// `config.rng_seed` is ignored.
    pub fn with_rng(
        network: NetworkConfig,
        config: EngineConfig,
        observer: O,
        rng: RngManager,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        network.validate()?;
        let fingerprint = network.fingerprint()?;

        let mut positions = Vec::with_capacity(network.positions.len());
        let mut position_index = HashMap::new();
        for (idx, pc) in network.positions.iter().enumerate() {
            // validate() rejected negative counts
            positions.push(Position::new(pc.name.clone(), pc.initial_tokens as u64));
            position_index.insert(pc.name.clone(), idx);
        }

        let mut transitions = Vec::with_capacity(network.transitions.len());
        let mut transition_index = HashMap::new();
        for (idx, tc) in network.transitions.into_iter().enumerate() {
            let inputs = tc
                .inputs
                .iter()
                .map(|arc| {
                    if arc.weight == 0 && arc.kind != ArcKind::Inhibitor {
                        warn!(
                            transition = %tc.name,
                            position = %arc.position,
                            "zero-weight input arc can never be satisfied"
                        );
                    }
                    InputArc {
                        position: position_index[&arc.position],
                        position_name: arc.position.clone(),
                        weight: arc.weight as u64,
                        kind: arc.kind,
                    }
                })
                .collect();
            let outputs = tc
                .outputs
                .iter()
                .map(|arc| OutputArc {
                    position: position_index[&arc.position],
                    position_name: arc.position.clone(),
                    weight: arc.weight as u64,
                })
                .collect();

            transition_index.insert(tc.name.clone(), idx);
            transitions.push(Transition::new(tc.name, inputs, outputs, tc.delay, tc.priority));
        }

        let mut firing_order: Vec<usize> = (0..transitions.len()).collect();
        firing_order.sort_by(|&a, &b| {
            let (ta, tb) = (&transitions[a], &transitions[b]);
            tb.priority()
                .cmp(&ta.priority())
                .then_with(|| ta.name().cmp(tb.name()))
        });

        Ok(Self {
            positions,
            position_index,
            transitions,
            transition_index,
            firing_order,
            clock: SimClock::new(config.horizon),
            rng,
            observer,
            event_log: EventLog::new(),
            config,
            fingerprint,
            started: false,
            finished: false,
            iterations: 0,
            firings: 0,
            completions: 0,
            firings_this_instant: 0,
        })
    }

    // ========================================================================
    // Main loop
    // ========================================================================

    /// Run to the horizon and settle statistics
    pub fn run(&mut self) -> Result<RunReport, SimulationError> {
        info!(
            horizon = self.clock.horizon(),
            positions = self.positions.len(),
            transitions = self.transitions.len(),
            fingerprint = %self.fingerprint,
            "starting run"
        );

        while let StepOutcome::Advanced { .. } = self.step()? {}

        let report = self.report();
        info!(
            iterations = report.iterations,
            firings = report.firings,
            completions = report.completions,
            in_flight = report.in_flight,
            "run finished"
        );
        Ok(report)
    }

    /// Process every iteration whose event time is earlier than `limit`
    ///
    /// Unlike [`run`](Self::run) this does not settle statistics, so a
    /// caller can sample the state at intermediate times and continue.
    pub fn run_until(&mut self, limit: f64) -> Result<(), SimulationError> {
        if self.finished {
            return Ok(());
        }
        if !self.started {
            self.step()?;
        }
        while let Some(next) = self.next_event_time() {
            if next >= limit || !self.clock.within_horizon(next) {
                break;
            }
            self.step()?;
        }
        Ok(())
    }

    /// Execute one iteration of the loop
    ///
    /// The first call performs the firing phase at time 0.
    pub fn step(&mut self) -> Result<StepOutcome, SimulationError> {
        if self.finished {
            return Ok(StepOutcome::Finished);
        }

        if !self.started {
            self.started = true;
            self.iterations += 1;
            let firings = self.firing_phase()?;
            return Ok(StepOutcome::Advanced {
                time: self.clock.now(),
                outputs: 0,
                firings,
            });
        }

        let next = match self.next_event_time() {
            Some(t) if self.clock.within_horizon(t) => t,
            _ => {
                self.finish();
                return Ok(StepOutcome::Finished);
            }
        };

        if next > self.clock.now() {
            self.firings_this_instant = 0;
        }
        self.clock.advance_to(next);
        self.iterations += 1;
        debug!(time = next, "advance");

        let outputs = self.output_phase(next)?;
        let firings = self.firing_phase()?;

        Ok(StepOutcome::Advanced {
            time: next,
            outputs,
            firings,
        })
    }

    /// Apply every output due at `time`, in transition declaration order
    fn output_phase(&mut self, time: f64) -> Result<usize, SimulationError> {
        let mut applied = 0;
        for transition in self.transitions.iter_mut() {
            while let Some(pending) = transition.take_due(time) {
                transition
                    .fire_output(&mut self.positions, time, pending.handle, &mut self.observer)
                    .map_err(|source| SimulationError::TokenOverflow {
                        time,
                        transition: transition.name().to_string(),
                        source,
                    })?;
                trace!(time, transition = transition.name(), "output applied");
                if self.config.record_events {
                    self.event_log.log(Event::Completed {
                        time,
                        transition: transition.name().to_string(),
                    });
                }
                applied += 1;
            }
        }
        self.completions += applied as u64;
        Ok(applied)
    }

    /// Fire enabled transitions until none is left
    fn firing_phase(&mut self) -> Result<usize, SimulationError> {
        let mut fired = 0;
        while let Some(idx) = self.select_enabled() {
            self.fire(idx)?;
            fired += 1;
        }
        Ok(fired)
    }

    fn select_enabled(&self) -> Option<usize> {
        self.firing_order
            .iter()
            .copied()
            .find(|&idx| self.transitions[idx].locally_enabled(&self.positions))
    }

    fn fire(&mut self, idx: usize) -> Result<(), SimulationError> {
        let time = self.clock.now();

        self.firings_this_instant += 1;
        if self.firings_this_instant > self.config.max_firings_per_instant {
            let name = self.transitions[idx].name().to_string();
            warn!(time, transition = %name, "firing phase did not converge");
            return Err(SimulationError::NonConvergent {
                time,
                firings: self.firings_this_instant - 1,
                last_transition: name,
            });
        }

        let transition = &mut self.transitions[idx];
        let output_time = transition
            .fire_input(&mut self.positions, time, &mut self.rng, &mut self.observer)
            .map_err(|source| SimulationError::InvariantViolation {
                time,
                transition: transition.name().to_string(),
                source,
            })?;

        trace!(time, output_time, transition = transition.name(), "fired");
        if self.config.record_events {
            self.event_log.log(Event::Fired {
                time,
                transition: transition.name().to_string(),
                output_time,
            });
        }
        self.firings += 1;
        Ok(())
    }

    /// Settle statistics at the horizon and stop
    fn finish(&mut self) {
        let horizon = self.clock.horizon();
        for position in self.positions.iter_mut() {
            position.settle(horizon);
        }
        self.clock.finish();
        self.finished = true;
        debug!(time = horizon, "statistics settled");
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Earliest scheduled output over all transitions
    pub fn next_event_time(&self) -> Option<f64> {
        self.transitions
            .iter()
            .filter_map(Transition::next_output_time)
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Whether `name` is enabled under the current marking, priorities included
    pub fn is_enabled(&self, name: &str) -> Result<bool, SimulationError> {
        let idx = self
            .transition_index
            .get(name)
            .ok_or_else(|| SimulationError::UnknownTransition(name.to_string()))?;
        Ok(self.transitions[*idx].is_enabled(&self.positions, &self.transitions))
    }

    /// Summary of the run so far
    pub fn report(&self) -> RunReport {
        RunReport {
            final_time: self.clock.now(),
            horizon: self.clock.horizon(),
            iterations: self.iterations,
            firings: self.firings,
            completions: self.completions,
            in_flight: self.transitions.iter().map(|t| t.in_flight() as u64).sum(),
            fingerprint: self.fingerprint.clone(),
            marking: self.snapshot(),
        }
    }

    pub fn snapshot(&self) -> MarkingSnapshot {
        MarkingSnapshot::capture(&self.positions)
    }

    pub fn current_time(&self) -> f64 {
        self.clock.now()
    }

    pub fn horizon(&self) -> f64 {
        self.clock.horizon()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn marking(&self) -> &[Position] {
        &self.positions
    }

    pub fn position(&self, name: &str) -> Option<&Position> {
        self.position_index.get(name).map(|&idx| &self.positions[idx])
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn transition(&self, name: &str) -> Option<&Transition> {
        self.transition_index
            .get(name)
            .map(|&idx| &self.transitions[idx])
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn into_observer(self) -> O {
        self.observer
    }

    pub fn rng(&self) -> &RngManager {
        &self.rng
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl<O: TransitionObserver> std::fmt::Debug for Engine<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("time", &self.clock.now())
            .field("horizon", &self.clock.horizon())
            .field("positions", &self.positions.len())
            .field("transitions", &self.transitions.len())
            .field("firings", &self.firings)
            .field("finished", &self.finished)
            .finish()
    }
}
