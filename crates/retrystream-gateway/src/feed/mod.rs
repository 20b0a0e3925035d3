//! Metrics feed runtime for the gateway.
//!
//! The subscriber registry and the broadcaster that polls statistics, projects
//! them, and fans the result out to every live subscriber.

mod broadcaster;
mod registry;

pub use broadcaster::{Broadcaster, DEFAULT_TICK_INTERVAL};
pub use registry::{Sink, Subscriber, SubscriberId, SubscriberRegistry};
