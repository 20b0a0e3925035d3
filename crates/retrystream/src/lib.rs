//! Top-level facade crate for retrystream.
//!
//! Re-exports the projection core and the gateway library so users can depend on a single crate.

pub mod core {
    pub use retrystream_core::*;
}

pub mod gateway {
    pub use retrystream_gateway::*;
}
