use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use retrystream_core::error::Result;
use retrystream_core::stats::{CIRCUIT_OPEN, CIRCUIT_SHORT_COUNT};
use retrystream_core::{AttributeValue, RollingStats, StatisticSnapshot, StatisticsSource};

use crate::stats::rolling::RollingAverage;

pub const DEFAULT_ROLLING_WINDOW: Duration = Duration::from_millis(15_000);

struct Entry {
    started: u64,
    complete: u64,
    errors: u64,
    aborts: u64,
    recoveries: u64,
    rolling_started: RollingAverage,
    rolling_errors: RollingAverage,
    rolling_aborts: RollingAverage,
    rolling_recoveries: RollingAverage,
    attributes: BTreeMap<String, AttributeValue>,
}

impl Entry {
    fn new(window: Duration, now: Instant) -> Self {
        Self {
            started: 0,
            complete: 0,
            errors: 0,
            aborts: 0,
            recoveries: 0,
            rolling_started: RollingAverage::new(window, now),
            rolling_errors: RollingAverage::new(window, now),
            rolling_aborts: RollingAverage::new(window, now),
            rolling_recoveries: RollingAverage::new(window, now),
            attributes: BTreeMap::new(),
        }
    }

    fn snapshot(&self, name: &str, now: Instant) -> StatisticSnapshot {
        let started = self.rolling_started.value(now);
        // Retries can log several errors per started call.
        let error_rate = if self.rolling_started.count(now) > 0 {
            (self.rolling_errors.value(now) / started).clamp(0.0, 1.0)
        } else {
            0.0
        };

        StatisticSnapshot {
            name: name.to_string(),
            started_count: self.started,
            complete_count: self.complete,
            error_count: self.errors,
            abort_count: self.aborts,
            recovery_count: self.recoveries,
            rolling: Some(RollingStats {
                started_count: self.rolling_started.count(now),
                error_rate,
                abort_count: self.rolling_aborts.count(now),
                recovery_count: self.rolling_recoveries.count(now),
            }),
            attributes: self.attributes.clone(),
        }
    }
}

/// Statistics repository: `name -> counters`.
///
/// Every `record_*` call has an `*_at` twin taking an explicit instant so
/// rolling behaviour can be driven deterministically.
pub struct StatisticsRepository {
    window: Duration,
    entries: DashMap<String, Entry>,
}

impl Default for StatisticsRepository {
    fn default() -> Self {
        Self::new(DEFAULT_ROLLING_WINDOW)
    }
}

impl StatisticsRepository {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            entries: DashMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    fn update<R>(&self, name: &str, now: Instant, f: impl FnOnce(&mut Entry) -> R) -> R {
        let mut entry = self
            .entries
            .entry(name.to_string())
            .or_insert_with(|| Entry::new(self.window, now));
        f(&mut entry)
    }

    pub fn record_started(&self, name: &str) {
        self.record_started_at(name, Instant::now());
    }

    pub fn record_started_at(&self, name: &str, now: Instant) {
        self.update(name, now, |e| {
            e.started += 1;
            e.rolling_started.increment(now);
        });
    }

    pub fn record_complete(&self, name: &str) {
        self.record_complete_at(name, Instant::now());
    }

    pub fn record_complete_at(&self, name: &str, now: Instant) {
        self.update(name, now, |e| e.complete += 1);
    }

    pub fn record_error(&self, name: &str) {
        self.record_error_at(name, Instant::now());
    }

    pub fn record_error_at(&self, name: &str, now: Instant) {
        self.update(name, now, |e| {
            e.errors += 1;
            e.rolling_errors.increment(now);
        });
    }

    /// Retries exhausted with no recovery path.
    pub fn record_abort(&self, name: &str) {
        self.record_abort_at(name, Instant::now());
    }

    pub fn record_abort_at(&self, name: &str, now: Instant) {
        self.update(name, now, |e| {
            e.aborts += 1;
            e.rolling_aborts.increment(now);
        });
    }

    /// Retries exhausted, recovered through a fallback.
    pub fn record_recovery(&self, name: &str) {
        self.record_recovery_at(name, Instant::now());
    }

    pub fn record_recovery_at(&self, name: &str, now: Instant) {
        self.update(name, now, |e| {
            e.recoveries += 1;
            e.rolling_recoveries.increment(now);
        });
    }

    pub fn set_attribute(&self, name: &str, key: &str, value: AttributeValue) {
        self.update(name, Instant::now(), |e| {
            e.attributes.insert(key.to_string(), value);
        });
    }

    pub fn open_circuit(&self, name: &str) {
        self.set_attribute(name, CIRCUIT_OPEN, AttributeValue::Bool(true));
    }

    pub fn close_circuit(&self, name: &str) {
        self.set_attribute(name, CIRCUIT_OPEN, AttributeValue::Bool(false));
    }

    /// Count one call rejected by an open circuit.
    pub fn record_short_circuit(&self, name: &str) {
        self.update(name, Instant::now(), |e| {
            let next = match e.attributes.get(CIRCUIT_SHORT_COUNT) {
                Some(AttributeValue::Int(n)) => n.saturating_add(1),
                _ => 1,
            };
            e.attributes
                .insert(CIRCUIT_SHORT_COUNT.to_string(), AttributeValue::Int(next));
        });
    }

    pub fn find_one(&self, name: &str) -> Option<StatisticSnapshot> {
        self.find_one_at(name, Instant::now())
    }

    pub fn find_one_at(&self, name: &str, now: Instant) -> Option<StatisticSnapshot> {
        self.entries.get(name).map(|e| e.snapshot(name, now))
    }

    /// Forget everything recorded for `name`.
    pub fn reset(&self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    /// All snapshots sorted by name.
    pub fn list_all_at(&self, now: Instant) -> Vec<StatisticSnapshot> {
        let mut all: Vec<StatisticSnapshot> = self
            .entries
            .iter()
            .map(|r| r.value().snapshot(r.key(), now))
            .collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl StatisticsSource for StatisticsRepository {
    fn list_all(&self) -> Result<Vec<StatisticSnapshot>> {
        Ok(self.list_all_at(Instant::now()))
    }
}
