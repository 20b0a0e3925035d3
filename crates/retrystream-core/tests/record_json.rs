//! Wire shape of the metric record as the dashboard reads it.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use retrystream_core::{project, RollingStats, StatisticSnapshot};
use serde_json::Value;

fn record_json() -> Value {
    let snap = StatisticSnapshot {
        started_count: 3,
        error_count: 1,
        ..StatisticSnapshot::new("home")
    }
    .with_rolling(RollingStats {
        started_count: 3,
        error_rate: 0.5,
        abort_count: 1,
        recovery_count: 0,
    });
    let rec = project(&snap).unwrap().stamped(1_700_000_000_000);
    serde_json::to_value(&rec).unwrap()
}

#[test]
fn derived_fields_use_dashboard_names() {
    let v = record_json();
    assert_eq!(v["name"], "home");
    assert_eq!(v["requestCount"], 3);
    assert_eq!(v["errorCount"], 1);
    assert_eq!(v["errorPercentage"], 50.0);
    assert_eq!(v["rollingCountFailure"], 1);
    assert_eq!(v["rollingCountSuccess"], 2);
    assert_eq!(v["isCircuitBreakerOpen"], false);
    assert_eq!(v["currentConcurrentExecutionCount"], 0);
    assert_eq!(v["currentTime"], 1_700_000_000_000u64);
}

#[test]
fn template_is_flattened_into_the_record() {
    let v = record_json();
    assert_eq!(v["type"], "HystrixCommand");
    assert_eq!(v["group"], "Spring");
    assert_eq!(v["threadPool"], "Spring");
    assert_eq!(v["reportingHosts"], 1);
    assert_eq!(v["propertyValue_executionIsolationStrategy"], "SEMAPHORE");
    assert_eq!(v["propertyValue_metricsRollingStatisticalWindowInMilliseconds"], 10000);
    assert_eq!(v["propertyValue_circuitBreakerErrorThresholdPercentage"], 50);
    assert!(v["propertyValue_executionIsolationThreadPoolKeyOverride"].is_null());
    assert_eq!(v["rollingCountTimeout"], 0);
    assert!(v.get("template").is_none());
}

#[test]
fn latency_percentiles_are_keyed_by_percent() {
    let v = record_json();
    let lat = v["latencyExecute"].as_object().unwrap();
    let mut keys: Vec<_> = lat.keys().cloned().collect();
    keys.sort();
    assert_eq!(keys, ["0", "100", "25", "50", "75", "90", "95", "99", "99.5"]);
    assert_eq!(v["latencyTotal_mean"], 0);
}
