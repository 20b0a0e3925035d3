//! Shared application state for the retrystream gateway.
//!
//! Wires the statistics repository, subscriber registry, and broadcaster from
//! a validated config. Startup errors are explicit (Result instead of panic).

use std::sync::Arc;

use retrystream_core::error::Result;
use retrystream_core::StatisticsSource;

use crate::config::GatewayConfig;
use crate::feed::{Broadcaster, SubscriberRegistry};
use crate::stats::StatisticsRepository;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    repository: Arc<StatisticsRepository>,
    broadcaster: Arc<Broadcaster>,
}

impl AppState {
    /// Build application state. The broadcaster is created stopped.
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        cfg.validate()?;

        let repository = Arc::new(StatisticsRepository::new(cfg.statistics.rolling_window()));
        let source: Arc<dyn StatisticsSource> = repository.clone();
        let broadcaster = Broadcaster::new(source, Arc::new(SubscriberRegistry::new()))
            .with_interval(cfg.feed.tick_interval());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                repository,
                broadcaster: Arc::new(broadcaster),
            }),
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn repository(&self) -> Arc<StatisticsRepository> {
        Arc::clone(&self.inner.repository)
    }

    pub fn broadcaster(&self) -> Arc<Broadcaster> {
        Arc::clone(&self.inner.broadcaster)
    }

    /// Live gauges rendered next to the feed counters.
    pub fn metrics_gauges(&self) -> Vec<(&'static str, u64)> {
        let broadcaster = &self.inner.broadcaster;
        vec![
            ("retrystream_subscribers_active", broadcaster.registry().len() as u64),
            ("retrystream_running", u64::from(broadcaster.is_running())),
            ("retrystream_statistics_tracked", self.inner.repository.len() as u64),
        ]
    }
}
