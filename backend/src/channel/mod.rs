//! Communication channel with a main and a reserve transmission path
//!
//! The net modelled here:
//!
//! ```text
//! P1  arrival source (1)         T1  arrival                 P1 -> P1 + P2
//! P2  incoming queue             T2  route to main           P2 [P8] -> P3
//! P3  main queue                 T3  route to reserve        P2 [P11] -> P4
//! P4  reserve queue              T4  transmit on main (pri 1) P3 + P6 [P8] -> P5 + P6
//! P5  transmitted                T5  transmit on reserve     P4 + P6 -> P5 + P6
//! P6  transmitter free (1)       T6  reroute while main down P3 <P8> -> P2
//! P7  failure source (1)         T7  failure                 P7 -> P7 + P9 + P10
//! P8  main channel up (1)        T8  switch to reserve       P9 -> P11
//! P9  switch-over pending        T9  recovery                P10 + P8 -> P12
//! P10 failure pending            T10 restore main            P11 + P12 -> P8
//! P11 reserve active
//! P12 main recovered
//! ```
//!
//! `[P]` is a guard arc (read, not consumed), `<P>` an inhibitor arc
//! (enabled only while P is empty).

use crate::models::delay::DelayDistribution;
use crate::orchestrator::config::{EngineConfig, NetworkConfig, TransitionConfig};
use crate::orchestrator::engine::{Engine, SimulationError};
use crate::orchestrator::observer::{ObserverHandle, TransitionObserver};
use crate::orchestrator::snapshot::RunReport;
use crate::rng::RngManager;
use crate::statistics::{Channel, ChannelStatistics, RecordLog};
use serde::{Deserialize, Serialize};

pub const ARRIVAL_SOURCE: &str = "P1";
pub const INCOMING_QUEUE: &str = "P2";
pub const MAIN_QUEUE: &str = "P3";
pub const RESERVE_QUEUE: &str = "P4";
pub const TRANSMITTED: &str = "P5";
pub const TRANSMITTER_FREE: &str = "P6";
pub const FAILURE_SOURCE: &str = "P7";
pub const MAIN_UP: &str = "P8";
pub const SWITCHOVER_PENDING: &str = "P9";
pub const FAILURE_PENDING: &str = "P10";
pub const RESERVE_ACTIVE: &str = "P11";
pub const MAIN_RECOVERED: &str = "P12";

/// Positions holding messages that wait for a channel
pub const QUEUE_POSITIONS: [&str; 3] = [INCOMING_QUEUE, MAIN_QUEUE, RESERVE_QUEUE];

pub const ARRIVAL: &str = "T1";
pub const ROUTE_MAIN: &str = "T2";
pub const ROUTE_RESERVE: &str = "T3";
pub const TRANSMIT_MAIN: &str = "T4";
pub const TRANSMIT_RESERVE: &str = "T5";
pub const REROUTE: &str = "T6";
pub const FAILURE: &str = "T7";
pub const SWITCHOVER: &str = "T8";
pub const RECOVERY: &str = "T9";
pub const RESTORE: &str = "T10";

/// Timing parameters of the channel model
///
/// Every random interval is a zero-clamped Gaussian.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelParams {
    pub arrival_mean: f64,
    pub arrival_std: f64,
    pub transmission_mean: f64,
    pub transmission_std: f64,
    pub failure_mean: f64,
    pub failure_std: f64,
    pub recovery_mean: f64,
    pub recovery_std: f64,

    /// Fixed time to bring the reserve channel up after a failure
    pub switchover_delay: f64,
}

impl Default for ChannelParams {
    fn default() -> Self {
        Self {
            arrival_mean: 9.0,
            arrival_std: 4.0,
            transmission_mean: 7.0,
            transmission_std: 3.0,
            failure_mean: 200.0,
            failure_std: 35.0,
            recovery_mean: 23.0,
            recovery_std: 7.0,
            switchover_delay: 2.0,
        }
    }
}

/// Build the channel net for `params`
pub fn network(params: &ChannelParams) -> NetworkConfig {
    let normal = |mean: f64, std_dev: f64| DelayDistribution::Normal { mean, std_dev };
    let transmission = normal(params.transmission_mean, params.transmission_std);

    NetworkConfig::new()
        .position(ARRIVAL_SOURCE, 1)
        .position(INCOMING_QUEUE, 0)
        .position(MAIN_QUEUE, 0)
        .position(RESERVE_QUEUE, 0)
        .position(TRANSMITTED, 0)
        .position(TRANSMITTER_FREE, 1)
        .position(FAILURE_SOURCE, 1)
        .position(MAIN_UP, 1)
        .position(SWITCHOVER_PENDING, 0)
        .position(FAILURE_PENDING, 0)
        .position(RESERVE_ACTIVE, 0)
        .position(MAIN_RECOVERED, 0)
        .transition(
            TransitionConfig::new(ARRIVAL)
                .input(ARRIVAL_SOURCE, 1)
                .output(INCOMING_QUEUE, 1)
                .output(ARRIVAL_SOURCE, 1)
                .delay(normal(params.arrival_mean, params.arrival_std)),
        )
        .transition(
            TransitionConfig::new(ROUTE_MAIN)
                .input(INCOMING_QUEUE, 1)
                .guard(MAIN_UP, 1)
                .output(MAIN_QUEUE, 1),
        )
        .transition(
            TransitionConfig::new(ROUTE_RESERVE)
                .input(INCOMING_QUEUE, 1)
                .guard(RESERVE_ACTIVE, 1)
                .output(RESERVE_QUEUE, 1),
        )
        .transition(
            TransitionConfig::new(TRANSMIT_MAIN)
                .input(MAIN_QUEUE, 1)
                .input(TRANSMITTER_FREE, 1)
                .guard(MAIN_UP, 1)
                .output(TRANSMITTED, 1)
                .output(TRANSMITTER_FREE, 1)
                .delay(transmission.clone())
                .priority(1),
        )
        .transition(
            TransitionConfig::new(TRANSMIT_RESERVE)
                .input(RESERVE_QUEUE, 1)
                .input(TRANSMITTER_FREE, 1)
                .output(TRANSMITTED, 1)
                .output(TRANSMITTER_FREE, 1)
                .delay(transmission),
        )
        .transition(
            TransitionConfig::new(REROUTE)
                .input(MAIN_QUEUE, 1)
                .inhibitor(MAIN_UP, 1)
                .output(INCOMING_QUEUE, 1),
        )
        .transition(
            TransitionConfig::new(FAILURE)
                .input(FAILURE_SOURCE, 1)
                .output(FAILURE_PENDING, 1)
                .output(SWITCHOVER_PENDING, 1)
                .output(FAILURE_SOURCE, 1)
                .delay(normal(params.failure_mean, params.failure_std)),
        )
        .transition(
            TransitionConfig::new(RECOVERY)
                .input(FAILURE_PENDING, 1)
                .input(MAIN_UP, 1)
                .output(MAIN_RECOVERED, 1)
                .delay(normal(params.recovery_mean, params.recovery_std)),
        )
        .transition(
            TransitionConfig::new(SWITCHOVER)
                .input(SWITCHOVER_PENDING, 1)
                .output(RESERVE_ACTIVE, 1)
                .delay(DelayDistribution::Fixed {
                    value: params.switchover_delay,
                }),
        )
        .transition(
            TransitionConfig::new(RESTORE)
                .input(RESERVE_ACTIVE, 1)
                .input(MAIN_RECOVERED, 1)
                .output(MAIN_UP, 1),
        )
}

/// Records transmissions, arrivals and failures of the channel net
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelObserver {
    records: RecordLog,
    arrivals: u64,
    failure_times: Vec<f64>,
}

impl ChannelObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &RecordLog {
        &self.records
    }

    /// Messages that entered the incoming queue
    pub fn arrivals(&self) -> u64 {
        self.arrivals
    }

    /// Instants at which the main channel failed
    pub fn failure_times(&self) -> &[f64] {
        &self.failure_times
    }
}

impl TransitionObserver for ChannelObserver {
    fn on_start(&mut self, transition: &str, time: f64) -> Option<ObserverHandle> {
        match transition {
            TRANSMIT_MAIN => Some(self.records.start(Channel::Main, time)),
            TRANSMIT_RESERVE => Some(self.records.start(Channel::Reserve, time)),
            _ => None,
        }
    }

    fn on_complete(&mut self, transition: &str, time: f64, handle: Option<ObserverHandle>) {
        match transition {
            ARRIVAL => self.arrivals += 1,
            FAILURE => self.failure_times.push(time),
            TRANSMIT_MAIN | TRANSMIT_RESERVE => {
                if let Some(handle) = handle {
                    self.records.complete(handle, time);
                }
            }
            _ => {}
        }
    }
}

/// Everything a run of the channel model produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelRun {
    pub report: RunReport,
    pub observer: ChannelObserver,
    pub statistics: ChannelStatistics,
}

/// Run the channel model once with its own seeded stream
///
/// # Example
///
/// ```
/// use channel_petri_sim::channel::{simulate, ChannelParams};
///
/// let run = simulate(&ChannelParams::default(), 1000.0, 42).unwrap();
/// assert!(run.statistics.total_messages > 0);
/// assert!(run.statistics.transmitted_messages as u64 <= run.statistics.total_messages);
/// ```
pub fn simulate(
    params: &ChannelParams,
    horizon: f64,
    seed: u64,
) -> Result<ChannelRun, SimulationError> {
    simulate_with_rng(params, horizon, RngManager::new(seed))
}

/// Run the channel model drawing delays from `rng`
pub fn simulate_with_rng(
    params: &ChannelParams,
    horizon: f64,
    rng: RngManager,
) -> Result<ChannelRun, SimulationError> {
    let config = EngineConfig {
        record_events: false,
        ..EngineConfig::new(horizon, 0)
    };
    let mut engine = Engine::with_rng(network(params), config, ChannelObserver::new(), rng)?;
    let report = engine.run()?;
    let observer = engine.into_observer();
    let statistics = ChannelStatistics::collect(&report, &observer);

    Ok(ChannelRun {
        report,
        observer,
        statistics,
    })
}
