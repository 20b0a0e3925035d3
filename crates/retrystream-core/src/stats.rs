//! Statistic snapshots and the source contract the broadcaster reads from.
//!
//! A snapshot is a point-in-time read of the counters kept for one named,
//! retry-protected operation. Only the name and the totals are mandatory;
//! rolling-window data and attributes depend on what the source tracks.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::Result;

/// Attribute key set while the operation's circuit is open.
pub const CIRCUIT_OPEN: &str = "circuit.open";
/// Attribute key carrying the number of short-circuited calls.
pub const CIRCUIT_SHORT_COUNT: &str = "circuit.shortCount";

/// Attribute value attached to a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
}

/// Counters aggregated over the recent rolling window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RollingStats {
    pub started_count: u32,
    /// Fraction in `0.0..=1.0`.
    pub error_rate: f64,
    pub abort_count: u32,
    pub recovery_count: u32,
}

/// Point-in-time statistics for one named operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticSnapshot {
    pub name: String,
    pub started_count: u64,
    pub complete_count: u64,
    pub error_count: u64,
    pub abort_count: u64,
    pub recovery_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rolling: Option<RollingStats>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl StatisticSnapshot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_rolling(mut self, rolling: RollingStats) -> Self {
        self.rolling = Some(rolling);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn attribute(&self, key: &str) -> Option<AttributeValue> {
        self.attributes.get(key).copied()
    }

    /// `None` when the attribute is absent or not a boolean.
    pub fn circuit_open(&self) -> Option<bool> {
        match self.attribute(CIRCUIT_OPEN)? {
            AttributeValue::Bool(open) => Some(open),
            AttributeValue::Int(_) => None,
        }
    }

    /// `None` when the attribute is absent, not an integer, or negative.
    pub fn short_circuit_count(&self) -> Option<u64> {
        match self.attribute(CIRCUIT_SHORT_COUNT)? {
            AttributeValue::Int(n) => u64::try_from(n).ok(),
            AttributeValue::Bool(_) => None,
        }
    }
}

/// Read-only view over the statistics currently tracked.
///
/// Implementations must be cheap and non-blocking: the broadcaster calls
/// `list_all` once per subscriber per tick.
pub trait StatisticsSource: Send + Sync {
    fn list_all(&self) -> Result<Vec<StatisticSnapshot>>;
}

/// A fixed set of snapshots.
impl StatisticsSource for Vec<StatisticSnapshot> {
    fn list_all(&self) -> Result<Vec<StatisticSnapshot>> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_of_the_wrong_type_read_as_absent() {
        let snap = StatisticSnapshot::new("home")
            .with_attribute(CIRCUIT_OPEN, AttributeValue::Int(1))
            .with_attribute(CIRCUIT_SHORT_COUNT, AttributeValue::Bool(true));
        assert_eq!(snap.circuit_open(), None);
        assert_eq!(snap.short_circuit_count(), None);
    }

    #[test]
    fn negative_short_count_reads_as_absent() {
        let snap = StatisticSnapshot::new("home")
            .with_attribute(CIRCUIT_SHORT_COUNT, AttributeValue::Int(-3));
        assert_eq!(snap.short_circuit_count(), None);
    }

    #[test]
    fn known_attributes_are_read_back() {
        let snap = StatisticSnapshot::new("home")
            .with_attribute(CIRCUIT_OPEN, AttributeValue::Bool(true))
            .with_attribute(CIRCUIT_SHORT_COUNT, AttributeValue::Int(7));
        assert_eq!(snap.circuit_open(), Some(true));
        assert_eq!(snap.short_circuit_count(), Some(7));
    }
}
