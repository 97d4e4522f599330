//! Statistics sink
//!
//! Turns the engine's two outputs (the final marking and the observer's
//! record log) into the figures a report is built from: throughput,
//! per-channel share and busy ratio, failure rate, queue peaks and
//! transmission time moments.

pub mod records;

pub use records::{Channel, RecordLog, TransmissionRecord};

use crate::channel::{ChannelObserver, QUEUE_POSITIONS};
use crate::orchestrator::snapshot::RunReport;
use serde::{Deserialize, Serialize};

/// Moments of a sample of transmission times
///
/// `std_dev` is the sample standard deviation (n - 1). Every field is 0
/// for an empty sample, and `std_dev` is 0 for a single observation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TransmissionStats {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl TransmissionStats {
    pub fn from_times(times: &[f64]) -> Self {
        if times.is_empty() {
            return Self::default();
        }

        let n = times.len();
        let mean = times.iter().sum::<f64>() / n as f64;
        let std_dev = if n > 1 {
            let ss: f64 = times.iter().map(|t| (t - mean).powi(2)).sum();
            (ss / (n - 1) as f64).sqrt()
        } else {
            0.0
        };

        Self {
            count: n,
            mean,
            std_dev,
            min: times.iter().copied().fold(f64::INFINITY, f64::min),
            max: times.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

/// Usage of one channel over a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelUtilization {
    /// Completed transmissions
    pub transmitted: usize,

    /// Completed transmissions over messages generated
    pub share: f64,

    /// Fraction of the horizon spent transmitting
    pub busy_ratio: f64,
}

/// Aggregated results of one channel-model run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelStatistics {
    pub horizon: f64,
    pub total_messages: u64,
    pub transmitted_messages: usize,
    pub failures: usize,

    /// Failures per unit of logical time
    pub failure_rate: f64,

    /// Sum of the peak occupancy of every queue position
    pub max_queue_length: u64,

    pub main: ChannelUtilization,
    pub reserve: ChannelUtilization,
    pub transmission: TransmissionStats,
}

impl ChannelStatistics {
    pub fn collect(report: &RunReport, observer: &ChannelObserver) -> Self {
        let horizon = report.horizon;
        let records = observer.records();
        let total_messages = observer.arrivals();

        let utilization = |channel: Channel| {
            let transmitted = records.completed_on(channel).count();
            let busy: f64 = records
                .on_channel(channel)
                .map(|r| r.busy_time_within(horizon))
                .sum();
            ChannelUtilization {
                transmitted,
                share: ratio(transmitted as f64, total_messages as f64),
                busy_ratio: ratio(busy, horizon),
            }
        };

        let main = utilization(Channel::Main);
        let reserve = utilization(Channel::Reserve);
        let failures = observer.failure_times().len();

        let max_queue_length = QUEUE_POSITIONS
            .iter()
            .filter_map(|name| report.marking.get(name))
            .map(|p| p.max_tokens)
            .sum();

        Self {
            horizon,
            total_messages,
            transmitted_messages: main.transmitted + reserve.transmitted,
            failures,
            failure_rate: ratio(failures as f64, horizon),
            max_queue_length,
            main,
            reserve,
            transmission: TransmissionStats::from_times(&records.transmission_times()),
        }
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}
