//! Transmission records
//!
//! One record per message occupying a channel. Records are opened when a
//! transmission starts and closed when it completes; the log hands out the
//! record index as the observer handle that links the two.

use crate::orchestrator::observer::ObserverHandle;
use serde::{Deserialize, Serialize};

/// Transmission path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Main,
    Reserve,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Main => "main",
            Channel::Reserve => "reserve",
        }
    }
}

/// One message transmission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransmissionRecord {
    pub start_time: f64,
    pub end_time: f64,
    pub channel: Channel,
    pub completed: bool,
}

impl TransmissionRecord {
    /// Duration of a completed transmission
    pub fn transmission_time(&self) -> Option<f64> {
        self.completed.then(|| self.end_time - self.start_time)
    }

    /// Time spent transmitting before `horizon`
    ///
    /// Transmissions still running at the horizon count up to it.
    pub fn busy_time_within(&self, horizon: f64) -> f64 {
        let end = if self.completed {
            self.end_time.min(horizon)
        } else {
            horizon
        };
        (end - self.start_time).max(0.0)
    }
}

/// Append-only log of transmission records, in start order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordLog {
    records: Vec<TransmissionRecord>,
}

impl RecordLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a record; the handle identifies it when it completes
    pub fn start(&mut self, channel: Channel, time: f64) -> ObserverHandle {
        self.records.push(TransmissionRecord {
            start_time: time,
            end_time: 0.0,
            channel,
            completed: false,
        });
        ObserverHandle((self.records.len() - 1) as u64)
    }

    /// Close the record behind `handle`
    ///
    /// Returns false if the handle is unknown or the record was already
    /// closed.
    pub fn complete(&mut self, handle: ObserverHandle, time: f64) -> bool {
        match self.records.get_mut(handle.0 as usize) {
            Some(record) if !record.completed => {
                record.end_time = time;
                record.completed = true;
                true
            }
            _ => false,
        }
    }

    pub fn records(&self) -> &[TransmissionRecord] {
        &self.records
    }

    pub fn get(&self, handle: ObserverHandle) -> Option<&TransmissionRecord> {
        self.records.get(handle.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn on_channel(&self, channel: Channel) -> impl Iterator<Item = &TransmissionRecord> {
        self.records.iter().filter(move |r| r.channel == channel)
    }

    pub fn completed_on(&self, channel: Channel) -> impl Iterator<Item = &TransmissionRecord> {
        self.on_channel(channel).filter(|r| r.completed)
    }

    /// Positive durations of completed transmissions, both channels
    ///
    /// Zero-length transmissions come from clamped service-time samples and
    /// are left out of the moments.
    pub fn transmission_times(&self) -> Vec<f64> {
        self.records
            .iter()
            .filter_map(TransmissionRecord::transmission_time)
            .filter(|&t| t > 0.0)
            .collect()
    }
}
