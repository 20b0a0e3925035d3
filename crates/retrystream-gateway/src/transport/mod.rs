//! Transport layer (Server-Sent Events).
//!
//! Exposes the subscription handler and the codec that turns feed frames into
//! SSE events.

pub mod codec;
pub mod sse;
