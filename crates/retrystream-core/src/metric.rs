//! Dashboard metric record (Hystrix `HystrixCommand` schema) and the frame
//! union delivered to subscribers.
//!
//! Only a handful of fields are derived from statistics; the rest of the
//! schema is a constant template the dashboard expects to be present.
//! Field names on the wire are fixed by the dashboard, hence the explicit
//! renames.

use serde::Serialize;

/// One projected record, ready for serialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricRecord {
    pub name: String,
    pub error_count: i64,
    /// Rolling started count; the dashboard divides it by the window size.
    pub request_count: i64,
    pub error_percentage: f64,
    /// Always 0: no source signal for in-flight executions.
    pub current_concurrent_execution_count: i64,
    pub rolling_count_short_circuited: i64,
    pub rolling_count_fallback_success: i64,
    pub rolling_count_failure: i64,
    pub rolling_count_success: i64,
    #[serde(rename = "isCircuitBreakerOpen")]
    pub circuit_breaker_open: bool,
    /// Epoch millis, stamped at send time.
    pub current_time: u64,
    #[serde(flatten)]
    pub template: CommandTemplate,
}

impl MetricRecord {
    pub fn stamped(mut self, current_time: u64) -> Self {
        self.current_time = current_time;
        self
    }
}

/// Static part of every record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandTemplate {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub group: &'static str,
    #[serde(rename = "threadPool")]
    pub thread_pool: &'static str,
    #[serde(rename = "reportingHosts")]
    pub reporting_hosts: u32,

    #[serde(rename = "propertyValue_requestLogEnabled")]
    pub request_log_enabled: bool,
    #[serde(rename = "propertyValue_requestCacheEnabled")]
    pub request_cache_enabled: bool,
    #[serde(rename = "propertyValue_metricsRollingStatisticalWindowInMilliseconds")]
    pub metrics_rolling_statistical_window_ms: u64,
    #[serde(rename = "propertyValue_fallbackIsolationSemaphoreMaxConcurrentRequests")]
    pub fallback_isolation_semaphore_max_concurrent_requests: u32,
    #[serde(rename = "propertyValue_executionIsolationSemaphoreMaxConcurrentRequests")]
    pub execution_isolation_semaphore_max_concurrent_requests: u32,
    #[serde(rename = "propertyValue_executionIsolationThreadPoolKeyOverride")]
    pub execution_isolation_thread_pool_key_override: Option<&'static str>,
    #[serde(rename = "propertyValue_executionIsolationThreadInterruptOnTimeout")]
    pub execution_isolation_thread_interrupt_on_timeout: bool,
    #[serde(rename = "propertyValue_executionTimeoutInMilliseconds")]
    pub execution_timeout_ms: u64,
    #[serde(rename = "propertyValue_executionIsolationThreadTimeoutInMilliseconds")]
    pub execution_isolation_thread_timeout_ms: u64,
    #[serde(rename = "propertyValue_executionIsolationStrategy")]
    pub execution_isolation_strategy: &'static str,
    #[serde(rename = "propertyValue_circuitBreakerEnabled")]
    pub circuit_breaker_enabled: bool,
    #[serde(rename = "propertyValue_circuitBreakerForceClosed")]
    pub circuit_breaker_force_closed: bool,
    #[serde(rename = "propertyValue_circuitBreakerForceOpen")]
    pub circuit_breaker_force_open: bool,
    #[serde(rename = "propertyValue_circuitBreakerErrorThresholdPercentage")]
    pub circuit_breaker_error_threshold_percentage: u32,
    #[serde(rename = "propertyValue_circuitBreakerRequestVolumeThreshold")]
    pub circuit_breaker_request_volume_threshold: u32,
    #[serde(rename = "propertyValue_circuitBreakerSleepWindowInMilliseconds")]
    pub circuit_breaker_sleep_window_ms: u64,

    #[serde(rename = "rollingCountFallbackMissing")]
    pub rolling_count_fallback_missing: i64,
    #[serde(rename = "rollingCountFallbackFailure")]
    pub rolling_count_fallback_failure: i64,
    #[serde(rename = "rollingCountFallbackEmit")]
    pub rolling_count_fallback_emit: i64,
    #[serde(rename = "rollingCountFallbackRejection")]
    pub rolling_count_fallback_rejection: i64,
    #[serde(rename = "rollingCountExceptionsThrown")]
    pub rolling_count_exceptions_thrown: i64,
    #[serde(rename = "rollingCountEmit")]
    pub rolling_count_emit: i64,
    #[serde(rename = "rollingCountCollapsedRequests")]
    pub rolling_count_collapsed_requests: i64,
    #[serde(rename = "rollingCountBadRequests")]
    pub rolling_count_bad_requests: i64,
    #[serde(rename = "rollingCountResponsesFromCache")]
    pub rolling_count_responses_from_cache: i64,
    #[serde(rename = "rollingCountSemaphoreRejected")]
    pub rolling_count_semaphore_rejected: i64,
    #[serde(rename = "rollingCountThreadPoolRejected")]
    pub rolling_count_thread_pool_rejected: i64,
    #[serde(rename = "rollingCountTimeout")]
    pub rolling_count_timeout: i64,
    #[serde(rename = "rollingMaxConcurrentExecutionCount")]
    pub rolling_max_concurrent_execution_count: i64,

    #[serde(rename = "latencyExecute_mean")]
    pub latency_execute_mean: i64,
    #[serde(rename = "latencyExecute")]
    pub latency_execute: Latency,
    #[serde(rename = "latencyTotal_mean")]
    pub latency_total_mean: i64,
    #[serde(rename = "latencyTotal")]
    pub latency_total: Latency,
}

impl Default for CommandTemplate {
    fn default() -> Self {
        Self {
            kind: "HystrixCommand",
            group: "Spring",
            thread_pool: "Spring",
            reporting_hosts: 1,
            request_log_enabled: true,
            request_cache_enabled: true,
            metrics_rolling_statistical_window_ms: 10_000,
            fallback_isolation_semaphore_max_concurrent_requests: 10,
            execution_isolation_semaphore_max_concurrent_requests: 10,
            execution_isolation_thread_pool_key_override: None,
            execution_isolation_thread_interrupt_on_timeout: true,
            execution_timeout_ms: 60_000,
            execution_isolation_thread_timeout_ms: 60_000,
            execution_isolation_strategy: "SEMAPHORE",
            circuit_breaker_enabled: true,
            circuit_breaker_force_closed: false,
            circuit_breaker_force_open: false,
            circuit_breaker_error_threshold_percentage: 50,
            circuit_breaker_request_volume_threshold: 20,
            circuit_breaker_sleep_window_ms: 5_000,
            rolling_count_fallback_missing: 0,
            rolling_count_fallback_failure: 0,
            rolling_count_fallback_emit: 0,
            rolling_count_fallback_rejection: 0,
            rolling_count_exceptions_thrown: 0,
            rolling_count_emit: 0,
            rolling_count_collapsed_requests: 0,
            rolling_count_bad_requests: 0,
            rolling_count_responses_from_cache: 0,
            rolling_count_semaphore_rejected: 0,
            rolling_count_thread_pool_rejected: 0,
            rolling_count_timeout: 0,
            rolling_max_concurrent_execution_count: 0,
            latency_execute_mean: 0,
            latency_execute: Latency::default(),
            latency_total_mean: 0,
            latency_total: Latency::default(),
        }
    }
}

/// Latency percentiles keyed the way the dashboard reads them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Latency {
    #[serde(rename = "0")]
    pub p0: i64,
    #[serde(rename = "25")]
    pub p25: i64,
    #[serde(rename = "50")]
    pub p50: i64,
    #[serde(rename = "75")]
    pub p75: i64,
    #[serde(rename = "90")]
    pub p90: i64,
    #[serde(rename = "95")]
    pub p95: i64,
    #[serde(rename = "99")]
    pub p99: i64,
    #[serde(rename = "99.5")]
    pub p99_5: i64,
    #[serde(rename = "100")]
    pub p100: i64,
}

/// Payload handed to a subscriber sink.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Metric(MetricRecord),
    /// Keep-alive sent when a tick has nothing to report.
    Ping,
}

impl Frame {
    /// Label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Frame::Metric(_) => "metric",
            Frame::Ping => "ping",
        }
    }
}
