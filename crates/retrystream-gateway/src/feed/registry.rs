use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use retrystream_core::error::Result;
use retrystream_core::Frame;

/// Stable subscriber identity, allocated in registration order.
pub type SubscriberId = u64;

/// Transport-owned delivery endpoint.
///
/// `send` must not block on a slow peer: fail fast and let the broadcaster
/// drop the subscriber instead.
pub trait Sink: Send + Sync {
    fn send(&self, frame: &Frame) -> Result<()>;
}

/// One registered sink.
#[derive(Clone)]
pub struct Subscriber {
    id: SubscriberId,
    sink: Arc<dyn Sink>,
}

impl Subscriber {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn send(&self, frame: &Frame) -> Result<()> {
        self.sink.send(frame)
    }
}

impl std::fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriber").field("id", &self.id).finish()
    }
}

/// Subscriber registry: `id -> sink`.
///
/// Mutations lock a single shard for the duration of one insert/remove.
/// Delivery never happens under a registry lock: the broadcaster works on
/// the copy returned by [`SubscriberRegistry::snapshot`].
pub struct SubscriberRegistry {
    subscribers: DashMap<SubscriberId, Subscriber>,
    seq: AtomicU64,
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self {
            subscribers: DashMap::new(),
            seq: AtomicU64::new(1),
        }
    }

    pub fn add(&self, sink: Arc<dyn Sink>) -> Subscriber {
        let id = self.seq.fetch_add(1, Ordering::Relaxed);
        let sub = Subscriber { id, sink };
        self.subscribers.insert(id, sub.clone());
        sub
    }

    /// Returns `false` if the id was not (or no longer) registered.
    pub fn remove(&self, id: SubscriberId) -> bool {
        self.subscribers.remove(&id).is_some()
    }

    pub fn contains(&self, id: SubscriberId) -> bool {
        self.subscribers.contains_key(&id)
    }

    /// Point-in-time copy in registration order.
    pub fn snapshot(&self) -> Vec<Subscriber> {
        let mut subs: Vec<Subscriber> = self.subscribers.iter().map(|r| r.value().clone()).collect();
        subs.sort_unstable_by_key(|s| s.id);
        subs
    }

    /// Drop every subscriber. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let ids: Vec<SubscriberId> = self.subscribers.iter().map(|r| *r.key()).collect();
        ids.into_iter().filter(|id| self.remove(*id)).count()
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}
