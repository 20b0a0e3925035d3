//! In-memory statistics source.
//!
//! Retry-protected code records its lifecycle events here; the broadcaster
//! reads them back through [`retrystream_core::StatisticsSource`].

mod repository;
mod rolling;

pub use repository::{StatisticsRepository, DEFAULT_ROLLING_WINDOW};
pub use rolling::RollingAverage;
