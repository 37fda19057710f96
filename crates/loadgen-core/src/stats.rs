use serde::Serialize;
use std::time::Duration;

use crate::counters::CounterView;

/// Live statistics projection returned by status reads. Recomputed on
/// every read, never stored.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub active: bool,
    pub target_rps: u32,
    pub actual_rps: f64,
    pub total_requests: u64,
    pub success_count: u64,
    pub fail_count: u64,
    pub success_rate: f64,
}

/// Pure projection of run state and counters into a snapshot.
pub fn project(
    active: bool,
    target_rps: u32,
    elapsed: Duration,
    counters: CounterView,
) -> StatsSnapshot {
    let elapsed_secs = elapsed.as_secs_f64();

    let actual_rps = if active && elapsed_secs > 0.0 {
        counters.total as f64 / elapsed_secs
    } else {
        0.0
    };

    let success_rate = if counters.total > 0 {
        counters.success as f64 / counters.total as f64 * 100.0
    } else {
        0.0
    };

    StatsSnapshot {
        active,
        target_rps,
        actual_rps,
        total_requests: counters.total,
        success_count: counters.success,
        fail_count: counters.failure,
        success_rate,
    }
}
