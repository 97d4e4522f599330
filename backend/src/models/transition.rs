//! Transition model
//!
//! A transition consumes tokens from its input positions when it fires and,
//! after a sampled delay, produces tokens into its output positions. Outputs
//! that have been scheduled but not yet applied are kept per transition as a
//! time-ordered multiset: two firings that complete at the same instant
//! yield two outputs.
//!
//! Arcs are resolved to position indices when the engine is built; the
//! position name is kept alongside for diagnostics.

use crate::models::delay::DelayDistribution;
use crate::models::position::{Position, PositionError};
use crate::orchestrator::observer::{ObserverHandle, TransitionObserver};
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};

/// How an input arc takes part in enabling and firing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArcKind {
    /// Requires `tokens >= weight` and removes `weight` tokens on firing
    #[default]
    Consume,

    /// Requires `tokens >= weight`, consumes nothing
    Guard,

    /// Requires `tokens < weight`, consumes nothing
    Inhibitor,
}

impl ArcKind {
    /// True if firing removes tokens through this arc
    pub fn consumes(self) -> bool {
        matches!(self, ArcKind::Consume)
    }
}

/// Input arc resolved against the engine's position table
#[derive(Debug, Clone, PartialEq)]
pub struct InputArc {
    pub position: usize,
    pub position_name: String,
    pub weight: u64,
    pub kind: ArcKind,
}

impl InputArc {
    /// Whether this arc's condition holds for `position`
    pub fn satisfied_by(&self, position: &Position) -> bool {
        match self.kind {
            ArcKind::Consume | ArcKind::Guard => position.has_capacity(self.weight),
            ArcKind::Inhibitor => position.tokens() < self.weight,
        }
    }
}

/// Output arc resolved against the engine's position table
#[derive(Debug, Clone, PartialEq)]
pub struct OutputArc {
    pub position: usize,
    pub position_name: String,
    pub weight: u64,
}

/// An output waiting to be applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingOutput {
    pub time: f64,
    /// Value returned by the observer's `on_start` for this firing
    pub handle: Option<ObserverHandle>,
}

/// A transition of the net together with its runtime state
#[derive(Debug, Clone)]
pub struct Transition {
    name: String,
    inputs: Vec<InputArc>,
    outputs: Vec<OutputArc>,
    delay: DelayDistribution,
    priority: i32,

    /// Scheduled outputs, ascending by time, FIFO among equal times
    pending: Vec<PendingOutput>,

    firings: u64,
    completions: u64,
}

impl Transition {
    pub fn new(
        name: impl Into<String>,
        inputs: Vec<InputArc>,
        outputs: Vec<OutputArc>,
        delay: DelayDistribution,
        priority: i32,
    ) -> Self {
        Self {
            name: name.into(),
            inputs,
            outputs,
            delay,
            priority,
            pending: Vec::new(),
            firings: 0,
            completions: 0,
        }
    }

    /// Every input arc is satisfied by the marking (priorities ignored)
    pub fn locally_enabled(&self, marking: &[Position]) -> bool {
        self.inputs
            .iter()
            .all(|arc| arc.satisfied_by(&marking[arc.position]))
    }

    /// Locally enabled and not pre-empted
    ///
    /// A transition is pre-empted while any other transition with a
    /// strictly higher priority is locally enabled on the same marking.
    /// Ties between equal priorities are settled by the engine.
    pub fn is_enabled(&self, marking: &[Position], all_transitions: &[Transition]) -> bool {
        if !self.locally_enabled(marking) {
            return false;
        }

        !all_transitions.iter().any(|other| {
            other.name != self.name
                && other.priority > self.priority
                && other.locally_enabled(marking)
        })
    }

    /// Consume input tokens and schedule the delayed output
    ///
    /// Returns the time the output is scheduled for. The marking is
    /// checked before anything is removed, so an error leaves it intact.
    pub fn fire_input<O: TransitionObserver + ?Sized>(
        &mut self,
        marking: &mut [Position],
        at_time: f64,
        rng: &mut RngManager,
        observer: &mut O,
    ) -> Result<f64, PositionError> {
        for arc in self.inputs.iter().filter(|a| a.kind.consumes()) {
            let position = &marking[arc.position];
            if position.tokens() < arc.weight {
                return Err(PositionError::InsufficientTokens {
                    position: arc.position_name.clone(),
                    requested: arc.weight,
                    available: position.tokens(),
                });
            }
        }

        for arc in self.inputs.iter().filter(|a| a.kind.consumes()) {
            marking[arc.position].remove_tokens(arc.weight, at_time)?;
        }

        let output_time = at_time + self.delay.sample(rng);
        let handle = observer.on_start(&self.name, at_time);
        self.schedule(PendingOutput {
            time: output_time,
            handle,
        });
        self.firings += 1;

        Ok(output_time)
    }

    /// Produce output tokens for one completed firing
    ///
    /// Every output position is checked for overflow before any token is
    /// added, so a failure leaves the marking unchanged.
    pub fn fire_output<O: TransitionObserver + ?Sized>(
        &mut self,
        marking: &mut [Position],
        at_time: f64,
        handle: Option<ObserverHandle>,
        observer: &mut O,
    ) -> Result<(), PositionError> {
        for arc in &self.outputs {
            marking[arc.position].check_add(arc.weight)?;
        }
        for arc in &self.outputs {
            marking[arc.position].add_tokens(arc.weight, at_time)?;
        }
        self.completions += 1;
        observer.on_complete(&self.name, at_time, handle);
        Ok(())
    }

    /// Remove and return the earliest pending output if it is due at `time`
    pub fn take_due(&mut self, time: f64) -> Option<PendingOutput> {
        match self.pending.first() {
            Some(first) if first.time <= time => Some(self.pending.remove(0)),
            _ => None,
        }
    }

    /// Earliest scheduled output time
    pub fn next_output_time(&self) -> Option<f64> {
        self.pending.first().map(|p| p.time)
    }

    fn schedule(&mut self, output: PendingOutput) {
        let idx = self.pending.partition_point(|p| p.time <= output.time);
        self.pending.insert(idx, output);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn inputs(&self) -> &[InputArc] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[OutputArc] {
        &self.outputs
    }

    pub fn delay(&self) -> &DelayDistribution {
        &self.delay
    }

    /// Scheduled output times, ascending
    pub fn pending_output_times(&self) -> Vec<f64> {
        self.pending.iter().map(|p| p.time).collect()
    }

    /// Number of outputs scheduled but not yet applied
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    pub fn firings(&self) -> u64 {
        self.firings
    }

    pub fn completions(&self) -> u64 {
        self.completions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::observer::NoopObserver;

    fn arc(position: usize, name: &str, weight: u64, kind: ArcKind) -> InputArc {
        InputArc {
            position,
            position_name: name.to_string(),
            weight,
            kind,
        }
    }

    fn out(position: usize, name: &str, weight: u64) -> OutputArc {
        OutputArc {
            position,
            position_name: name.to_string(),
            weight,
        }
    }

    #[test]
    fn test_inhibitor_requires_fewer_tokens_than_weight() {
        let t = Transition::new(
            "T6",
            vec![arc(0, "P8", 1, ArcKind::Inhibitor)],
            vec![],
            DelayDistribution::Immediate,
            0,
        );
        assert!(t.locally_enabled(&[Position::new("P8", 0)]));
        assert!(!t.locally_enabled(&[Position::new("P8", 1)]));
    }

    #[test]
    fn test_same_time_outputs_are_kept_separately() {
        let mut marking = vec![Position::new("A", 2), Position::new("B", 0)];
        let mut t = Transition::new(
            "T",
            vec![arc(0, "A", 1, ArcKind::Consume)],
            vec![out(1, "B", 1)],
            DelayDistribution::Fixed { value: 3.0 },
            0,
        );
        let mut rng = RngManager::new(1);

        t.fire_input(&mut marking, 0.0, &mut rng, &mut NoopObserver)
            .unwrap();
        t.fire_input(&mut marking, 0.0, &mut rng, &mut NoopObserver)
            .unwrap();

        assert_eq!(t.pending_output_times(), vec![3.0, 3.0]);
        assert!(t.take_due(3.0).is_some());
        assert!(t.take_due(3.0).is_some());
        assert!(t.take_due(3.0).is_none());
    }

    #[test]
    fn test_failed_fire_input_leaves_marking_intact() {
        let mut marking = vec![Position::new("A", 1), Position::new("B", 0)];
        let mut t = Transition::new(
            "T",
            vec![arc(0, "A", 1, ArcKind::Consume), arc(1, "B", 1, ArcKind::Consume)],
            vec![],
            DelayDistribution::Immediate,
            0,
        );
        let mut rng = RngManager::new(1);

        let err = t
            .fire_input(&mut marking, 0.0, &mut rng, &mut NoopObserver)
            .unwrap_err();
        assert!(matches!(err, PositionError::InsufficientTokens { .. }));
        assert_eq!(marking[0].tokens(), 1);
        assert_eq!(t.in_flight(), 0);
        assert_eq!(t.firings(), 0);
    }

    #[test]
    fn test_overflowing_fire_output_leaves_marking_intact() {
        let half = u64::MAX / 2;
        let mut marking = vec![Position::new("A", 1), Position::new("B", half + 1)];
        let mut t = Transition::new(
            "T",
            vec![],
            vec![out(0, "A", 1), out(1, "B", half + 1)],
            DelayDistribution::Immediate,
            0,
        );

        let err = t
            .fire_output(&mut marking, 1.0, None, &mut NoopObserver)
            .unwrap_err();
        assert!(matches!(err, PositionError::TokenOverflow { ref position, .. } if position == "B"));
        assert_eq!(marking[0].tokens(), 1, "earlier arcs must not be applied");
        assert_eq!(marking[1].tokens(), half + 1);
        assert_eq!(t.completions(), 0);
    }

    #[test]
    fn test_pending_outputs_ordered_by_time() {
        let mut marking = vec![Position::new("A", 3)];
        let mut rng = RngManager::new(3);
        let mut t = Transition::new(
            "T",
            vec![arc(0, "A", 1, ArcKind::Consume)],
            vec![],
            DelayDistribution::Uniform { min: 0.0, max: 10.0 },
            0,
        );
        for _ in 0..3 {
            t.fire_input(&mut marking, 0.0, &mut rng, &mut NoopObserver)
                .unwrap();
        }
        let times = t.pending_output_times();
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(t.next_output_time(), Some(times[0]));
    }
}
