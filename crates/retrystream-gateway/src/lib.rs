//! retrystream gateway library entry.
//!
//! This crate wires the statistics repository, the metrics feed (subscriber
//! registry + broadcaster), the SSE transport, and ops endpoints into a
//! cohesive gateway. It is consumed by the binary (`main.rs`) and by
//! integration tests.

pub mod app_state;
pub mod config;
pub mod feed;
pub mod obs;
pub mod ops;
pub mod router;
pub mod services;
pub mod stats;
pub mod transport;
