//! Broadcaster lifecycle against a live tokio runtime.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, Weak};
use std::time::Duration;

use retrystream_core::error::{Result, StreamError};
use retrystream_core::{Frame, RollingStats, StatisticSnapshot, StatisticsSource};
use retrystream_gateway::feed::{Broadcaster, Sink, SubscriberRegistry};

const FOREVER: Duration = Duration::from_secs(3600);

#[derive(Default)]
struct Recorder {
    frames: Mutex<Vec<Frame>>,
}

impl Recorder {
    fn count(&self) -> usize {
        self.frames.lock().unwrap().len()
    }
}

impl Sink for Recorder {
    fn send(&self, frame: &Frame) -> Result<()> {
        self.frames.lock().unwrap().push(frame.clone());
        Ok(())
    }
}

#[derive(Default)]
struct Broken {
    attempts: AtomicUsize,
}

impl Sink for Broken {
    fn send(&self, _frame: &Frame) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(StreamError::SinkClosed)
    }
}

/// Stops the broadcaster from inside its own delivery.
#[derive(Default)]
struct Stopper {
    broadcaster: OnceLock<Weak<Broadcaster>>,
    sends: AtomicUsize,
}

impl Sink for Stopper {
    fn send(&self, _frame: &Frame) -> Result<()> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        if let Some(b) = self.broadcaster.get().and_then(Weak::upgrade) {
            b.stop();
        }
        Ok(())
    }
}

#[derive(Default)]
struct CountingSource {
    calls: AtomicUsize,
    snapshots: Vec<StatisticSnapshot>,
}

impl StatisticsSource for CountingSource {
    fn list_all(&self) -> Result<Vec<StatisticSnapshot>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.snapshots.clone())
    }
}

fn active(name: &str) -> StatisticSnapshot {
    StatisticSnapshot {
        started_count: 1,
        ..StatisticSnapshot::new(name)
    }
    .with_rolling(RollingStats {
        started_count: 1,
        ..RollingStats::default()
    })
}

fn broadcaster(source: Arc<dyn StatisticsSource>, interval: Duration) -> Arc<Broadcaster> {
    Arc::new(Broadcaster::new(source, Arc::new(SubscriberRegistry::new())).with_interval(interval))
}

async fn eventually(mut cond: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    cond()
}

#[tokio::test]
async fn starting_twice_runs_a_single_loop() {
    let source = Arc::new(CountingSource::default());
    let b = broadcaster(source.clone(), FOREVER);
    let rec = Arc::new(Recorder::default());
    b.registry().add(rec.clone());

    assert!(b.start());
    assert!(!b.start());
    assert!(b.is_running());

    assert!(eventually(|| rec.count() >= 1).await);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert_eq!(rec.count(), 1);

    b.shutdown().await;
}

#[tokio::test]
async fn stop_drops_every_subscriber() {
    let b = broadcaster(Arc::new(Vec::<StatisticSnapshot>::new()), FOREVER);
    for _ in 0..3 {
        b.registry().add(Arc::new(Recorder::default()));
    }

    assert!(b.start());
    assert!(b.stop());
    assert!(!b.is_running());
    assert!(b.registry().is_empty());
    assert!(b.registry().snapshot().is_empty());
    assert!(!b.stop());
}

#[tokio::test]
async fn restart_is_a_fresh_lifecycle() {
    let b = broadcaster(Arc::new(vec![active("home")]), Duration::from_millis(20));
    let stale = Arc::new(Recorder::default());
    b.registry().add(stale.clone());

    assert!(b.start());
    b.shutdown().await;
    let stale_count = stale.count();

    assert!(b.start());
    let fresh = Arc::new(Recorder::default());
    b.registry().add(fresh.clone());
    assert!(eventually(|| fresh.count() >= 2).await);
    assert_eq!(stale.count(), stale_count);

    b.shutdown().await;
}

#[tokio::test]
async fn failing_subscriber_is_removed_after_one_tick() {
    let b = broadcaster(Arc::new(vec![active("home")]), Duration::from_millis(10));
    let broken = Arc::new(Broken::default());
    let healthy = Arc::new(Recorder::default());
    let broken_id = b.registry().add(broken.clone()).id();
    b.registry().add(healthy.clone());

    b.start();
    assert!(eventually(|| healthy.count() >= 5).await);

    assert_eq!(broken.attempts.load(Ordering::SeqCst), 1);
    assert!(!b.registry().contains(broken_id));
    b.shutdown().await;
}

#[tokio::test]
async fn stop_mid_tick_skips_remaining_subscribers() {
    let b = broadcaster(Arc::new(vec![active("home")]), FOREVER);
    let stopper = Arc::new(Stopper::default());
    stopper.broadcaster.set(Arc::downgrade(&b)).unwrap();
    let later = Arc::new(Recorder::default());
    b.registry().add(stopper.clone());
    b.registry().add(later.clone());

    b.start();
    assert!(eventually(|| !b.is_running()).await);
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(stopper.sends.load(Ordering::SeqCst), 1);
    assert_eq!(later.count(), 0);
}

#[tokio::test]
async fn stop_interrupts_the_inter_tick_sleep() {
    let b = broadcaster(Arc::new(Vec::<StatisticSnapshot>::new()), FOREVER);
    b.start();
    tokio::time::sleep(Duration::from_millis(20)).await;

    tokio::time::timeout(Duration::from_secs(1), b.shutdown())
        .await
        .expect("loop must wake up on stop");
    assert!(!b.is_running());
}

#[tokio::test]
async fn subscribe_is_refused_while_stopped() {
    let b = broadcaster(Arc::new(Vec::<StatisticSnapshot>::new()), FOREVER);
    assert!(b.subscribe(Arc::new(Recorder::default())).is_none());
    assert!(b.registry().is_empty());

    b.start();
    let sub = b.subscribe(Arc::new(Recorder::default())).unwrap();
    assert!(b.registry().contains(sub.id()));

    b.shutdown().await;
    assert!(b.subscribe(Arc::new(Recorder::default())).is_none());
    assert!(b.registry().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn subscribe_racing_stop_leaves_no_subscribers() {
    let b = broadcaster(Arc::new(Vec::<StatisticSnapshot>::new()), FOREVER);

    for _ in 0..2_000 {
        assert!(b.start());

        let stopping = {
            let b = Arc::clone(&b);
            tokio::task::spawn_blocking(move || b.stop())
        };
        let subscribing = {
            let b = Arc::clone(&b);
            tokio::task::spawn_blocking(move || b.subscribe(Arc::new(Recorder::default())))
        };

        assert!(stopping.await.unwrap());
        let accepted = subscribing.await.unwrap();

        assert!(!b.is_running());
        assert!(
            b.registry().is_empty(),
            "subscriber {:?} survived stop",
            accepted.map(|s| s.id())
        );
    }
}

#[tokio::test]
async fn huge_interval_starts_and_stops_cleanly() {
    let b = broadcaster(Arc::new(Vec::<StatisticSnapshot>::new()), Duration::MAX);
    assert!(b.start());
    assert_eq!(b.interval(), Duration::MAX);

    tokio::time::timeout(Duration::from_secs(1), b.shutdown())
        .await
        .expect("stop must interrupt an unbounded sleep");
    assert!(!b.is_running());
}
