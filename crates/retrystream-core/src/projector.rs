//! Statistic snapshot -> dashboard metric record.
//!
//! Failure bucketing: executions that recovered through a fallback count as
//! failures, so `rollingCountFailure = aborts + fallback successes` and
//! `rollingCountSuccess = requestCount - rollingCountFailure`. Success and
//! failure therefore always sum to the rolling started count.

use crate::metric::{CommandTemplate, MetricRecord};
use crate::stats::StatisticSnapshot;

/// Project one snapshot.
///
/// Returns `None` for snapshots that have never started an execution; those
/// are left out of the feed entirely. `current_time` is left at 0 so the
/// result depends only on the snapshot.
pub fn project(snapshot: &StatisticSnapshot) -> Option<MetricRecord> {
    if snapshot.started_count == 0 {
        return None;
    }

    let rolling = snapshot.rolling.unwrap_or_default();
    let request_count = i64::from(rolling.started_count);
    let fallback_success = i64::from(rolling.recovery_count);
    let failure = i64::from(rolling.abort_count) + fallback_success;

    Some(MetricRecord {
        name: snapshot.name.clone(),
        error_count: saturating_i64(snapshot.error_count),
        request_count,
        error_percentage: rolling.error_rate * 100.0,
        current_concurrent_execution_count: 0,
        rolling_count_short_circuited: saturating_i64(snapshot.short_circuit_count().unwrap_or(0)),
        rolling_count_fallback_success: fallback_success,
        rolling_count_failure: failure,
        rolling_count_success: request_count - failure,
        circuit_breaker_open: snapshot.circuit_open().unwrap_or(false),
        current_time: 0,
        template: CommandTemplate::default(),
    })
}

/// Project every active snapshot, preserving source order.
pub fn project_all<'a, I>(snapshots: I) -> Vec<MetricRecord>
where
    I: IntoIterator<Item = &'a StatisticSnapshot>,
{
    snapshots.into_iter().filter_map(project).collect()
}

fn saturating_i64(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}
