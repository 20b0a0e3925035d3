use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use retrystream_core::error::Result;
use retrystream_core::{project_all, Frame, StatisticsSource};

use crate::feed::registry::{Sink, Subscriber, SubscriberRegistry};
use crate::obs::FeedMetrics;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(500);

enum Lifecycle {
    Stopped,
    Running {
        stop_tx: watch::Sender<bool>,
        task: JoinHandle<()>,
    },
}

/// Broadcaster: periodically projects statistics and pushes them to every
/// registered subscriber.
///
/// `start`/`stop` are idempotent and callable from any thread. Stopping drops
/// every subscriber; clients must re-subscribe after the next `start`.
pub struct Broadcaster {
    feed: Arc<Feed>,
    interval: Duration,
    lifecycle: Mutex<Lifecycle>,
}

impl Broadcaster {
    pub fn new(source: Arc<dyn StatisticsSource>, registry: Arc<SubscriberRegistry>) -> Self {
        Self {
            feed: Arc::new(Feed {
                source,
                registry,
                metrics: Arc::new(FeedMetrics::default()),
            }),
            interval: DEFAULT_TICK_INTERVAL,
            lifecycle: Mutex::new(Lifecycle::Stopped),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<FeedMetrics>) -> Self {
        // Only reachable before the feed is shared with a loop task.
        if let Some(feed) = Arc::get_mut(&mut self.feed) {
            feed.metrics = metrics;
        }
        self
    }

    pub fn registry(&self) -> &Arc<SubscriberRegistry> {
        &self.feed.registry
    }

    pub fn metrics(&self) -> &Arc<FeedMetrics> {
        &self.feed.metrics
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        matches!(*self.lock(), Lifecycle::Running { .. })
    }

    /// Register `sink` only while running.
    ///
    /// The check and the insert happen under the lifecycle lock, so a
    /// concurrent `stop` either sees the new subscriber and clears it, or
    /// this call sees `Stopped` and returns `None`.
    pub fn subscribe(&self, sink: Arc<dyn Sink>) -> Option<Subscriber> {
        let state = self.lock();
        if !matches!(*state, Lifecycle::Running { .. }) {
            return None;
        }
        Some(self.feed.registry.add(sink))
    }

    /// Spawn the tick loop on the current tokio runtime.
    ///
    /// Returns `false` (and does nothing) if already running.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn start(&self) -> bool {
        let mut state = self.lock();
        if matches!(*state, Lifecycle::Running { .. }) {
            return false;
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(run(Arc::clone(&self.feed), self.interval, stop_rx));
        *state = Lifecycle::Running { stop_tx, task };

        let interval_ms = u64::try_from(self.interval.as_millis()).unwrap_or(u64::MAX);
        tracing::info!(interval_ms, "feed broadcaster started");
        true
    }

    /// Signal the loop to exit and drop every subscriber.
    ///
    /// Returns `false` (and does nothing) if already stopped.
    pub fn stop(&self) -> bool {
        self.halt().is_some()
    }

    /// `stop`, then wait for the loop task to finish.
    pub async fn shutdown(&self) {
        if let Some(task) = self.halt() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "feed loop task did not exit cleanly");
            }
        }
    }

    fn halt(&self) -> Option<JoinHandle<()>> {
        let mut state = self.lock();
        let Lifecycle::Running { stop_tx, task } = std::mem::replace(&mut *state, Lifecycle::Stopped) else {
            return None;
        };

        // No receiver means the loop already exited.
        let _ = stop_tx.send(true);
        let dropped = self.feed.registry.clear();
        drop(state);

        tracing::info!(dropped_subscribers = dropped, "feed broadcaster stopped");
        Some(task)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TickOutcome {
    Completed,
    Stopped,
}

/// State shared between the broadcaster handle and its loop task.
struct Feed {
    source: Arc<dyn StatisticsSource>,
    registry: Arc<SubscriberRegistry>,
    metrics: Arc<FeedMetrics>,
}

impl Feed {
    /// One pass over the current subscribers. `running` is re-checked after
    /// every subscriber.
    fn tick(&self, running: impl Fn() -> bool) -> TickOutcome {
        if !running() {
            return TickOutcome::Stopped;
        }

        let started = Instant::now();
        self.metrics.ticks.inc(&[]);

        let mut outcome = TickOutcome::Completed;
        for sub in self.registry.snapshot() {
            self.deliver(&sub);
            if !running() {
                outcome = TickOutcome::Stopped;
                break;
            }
        }

        self.metrics.tick_duration.observe(&[], started.elapsed());
        outcome
    }

    /// Any fault while serving one subscriber drops that subscriber only.
    fn deliver(&self, sub: &Subscriber) {
        match catch_unwind(AssertUnwindSafe(|| self.send_current(sub))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                if self.registry.remove(sub.id()) {
                    self.metrics.subscriber_drops.inc(&[("reason", "send_failed")]);
                }
                tracing::debug!(
                    subscriber = sub.id(),
                    code = e.code().as_str(),
                    error = %e,
                    "dropping subscriber after failed send"
                );
            }
            Err(_) => {
                if self.registry.remove(sub.id()) {
                    self.metrics.subscriber_drops.inc(&[("reason", "panicked")]);
                }
                tracing::error!(subscriber = sub.id(), "subscriber delivery panicked, dropping subscriber");
            }
        }
    }

    fn send_current(&self, sub: &Subscriber) -> Result<()> {
        for frame in self.current_frames() {
            sub.send(&frame)?;
            self.metrics.frames_sent.inc(&[("kind", frame.kind())]);
        }
        Ok(())
    }

    /// Metric frames in source order, or a single ping when nothing is active.
    fn current_frames(&self) -> Vec<Frame> {
        let snapshots = match self.source.list_all() {
            Ok(snapshots) => snapshots,
            Err(e) => {
                self.metrics.source_errors.inc(&[]);
                tracing::warn!(error = %e, "statistics source read failed, sending keep-alive");
                Vec::new()
            }
        };

        let records = project_all(&snapshots);
        if records.is_empty() {
            return vec![Frame::Ping];
        }
        let now = epoch_millis();
        records
            .into_iter()
            .map(|r| Frame::Metric(r.stamped(now)))
            .collect()
    }
}

async fn run(feed: Arc<Feed>, interval: Duration, mut stop_rx: watch::Receiver<bool>) {
    tracing::debug!("feed loop running");
    loop {
        let outcome = {
            let rx = &stop_rx;
            feed.tick(|| !*rx.borrow())
        };
        if outcome == TickOutcome::Stopped {
            break;
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            changed = stop_rx.changed() => {
                // A dropped sender means the broadcaster itself is gone.
                if changed.is_err() || *stop_rx.borrow() {
                    break;
                }
            }
        }
    }
    tracing::debug!("feed loop exited");
}

fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
