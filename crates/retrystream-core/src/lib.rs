//! retrystream core: statistic snapshots, the Hystrix metric record, and the
//! projection between them.
//!
//! This crate defines the data contracts shared by the gateway, the statistics
//! sources that feed it, and any alternative transport. It intentionally carries
//! no transport or runtime dependencies so it can be reused in multiple contexts.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Projection never fails: missing optional data is a defined zero, not an error.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod metric;
pub mod projector;
pub mod stats;

/// Shared result type.
pub use error::{Result, StreamError};
pub use metric::{Frame, Latency, MetricRecord};
pub use projector::{project, project_all};
pub use stats::{AttributeValue, RollingStats, StatisticSnapshot, StatisticsSource};
