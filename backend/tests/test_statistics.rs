//! Aggregation of run outputs into channel statistics

use channel_petri_sim::channel::{
    ChannelObserver, ARRIVAL, FAILURE, TRANSMIT_MAIN, TRANSMIT_RESERVE,
};
use channel_petri_sim::orchestrator::{MarkingSnapshot, PositionSnapshot, RunReport};
use channel_petri_sim::statistics::{Channel, ChannelStatistics, TransmissionStats};
use channel_petri_sim::TransitionObserver;

fn queue(name: &str, max_tokens: u64) -> PositionSnapshot {
    PositionSnapshot {
        name: name.to_string(),
        tokens: 0,
        total_inflow: max_tokens,
        max_tokens,
        total_busy_time: 0.0,
    }
}

fn report(horizon: f64) -> RunReport {
    RunReport {
        final_time: horizon,
        horizon,
        iterations: 0,
        firings: 0,
        completions: 0,
        in_flight: 0,
        fingerprint: String::new(),
        marking: MarkingSnapshot {
            positions: vec![queue("P2", 3), queue("P3", 1), queue("P4", 2), queue("P5", 9)],
        },
    }
}

fn transmit(observer: &mut ChannelObserver, name: &str, start: f64, end: Option<f64>) {
    let handle = observer.on_start(name, start);
    if let Some(end) = end {
        observer.on_complete(name, end, handle);
    }
}

fn observed_run() -> ChannelObserver {
    let mut observer = ChannelObserver::new();
    for t in [1.0, 15.0, 45.0, 90.0] {
        observer.on_complete(ARRIVAL, t, None);
    }
    transmit(&mut observer, TRANSMIT_MAIN, 0.0, Some(10.0));
    transmit(&mut observer, TRANSMIT_MAIN, 20.0, Some(26.0));
    observer.on_complete(FAILURE, 40.0, None);
    transmit(&mut observer, TRANSMIT_RESERVE, 50.0, Some(58.0));
    transmit(&mut observer, TRANSMIT_MAIN, 95.0, None);
    observer
}

#[test]
fn test_collect_counts_and_rates() {
    let stats = ChannelStatistics::collect(&report(100.0), &observed_run());

    assert_eq!(stats.total_messages, 4);
    assert_eq!(stats.transmitted_messages, 3);
    assert_eq!(stats.failures, 1);
    assert_eq!(stats.failure_rate, 0.01);
    assert_eq!(stats.max_queue_length, 6, "P2 + P3 + P4 peaks");
}

#[test]
fn test_collect_channel_utilization() {
    let stats = ChannelStatistics::collect(&report(100.0), &observed_run());

    assert_eq!(stats.main.transmitted, 2);
    assert_eq!(stats.main.share, 0.5);
    // 10 + 6 completed, plus 5 of the transmission still running at 100
    assert_eq!(stats.main.busy_ratio, 0.21);

    assert_eq!(stats.reserve.transmitted, 1);
    assert_eq!(stats.reserve.share, 0.25);
    assert_eq!(stats.reserve.busy_ratio, 0.08);
}

#[test]
fn test_collect_transmission_moments() {
    let stats = ChannelStatistics::collect(&report(100.0), &observed_run());
    assert_eq!(
        stats.transmission,
        TransmissionStats {
            count: 3,
            mean: 8.0,
            std_dev: 2.0,
            min: 6.0,
            max: 10.0,
        }
    );
}

#[test]
fn test_collect_without_messages() {
    let stats = ChannelStatistics::collect(&report(50.0), &ChannelObserver::new());

    assert_eq!(stats.total_messages, 0);
    assert_eq!(stats.main.share, 0.0);
    assert_eq!(stats.reserve.busy_ratio, 0.0);
    assert_eq!(stats.transmission, TransmissionStats::default());
}

#[test]
fn test_records_in_start_order() {
    let observer = observed_run();
    let channels: Vec<Channel> = observer
        .records()
        .records()
        .iter()
        .map(|r| r.channel)
        .collect();
    assert_eq!(
        channels,
        vec![Channel::Main, Channel::Main, Channel::Reserve, Channel::Main]
    );
}

#[test]
fn test_statistics_serialize_to_json() {
    let stats = ChannelStatistics::collect(&report(100.0), &observed_run());
    let json = serde_json::to_value(&stats).unwrap();
    assert_eq!(json["main"]["transmitted"], 2);
    assert_eq!(json["transmission"]["mean"], 8.0);
}
