use std::time::Duration;

use serde::Deserialize;
use retrystream_core::error::{Result, StreamError};

use crate::router::RESERVED_PATHS;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub feed: FeedSection,

    #[serde(default)]
    pub statistics: StatisticsSection,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: 1,
            gateway: GatewaySection::default(),
            feed: FeedSection::default(),
            statistics: StatisticsSection::default(),
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(StreamError::UnsupportedVersion);
        }

        self.gateway.validate()?;
        self.feed.validate()?;
        self.statistics.validate()?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_stream_path")]
    pub stream_path: String,

    #[serde(default)]
    pub demo_routes: bool,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            stream_path: default_stream_path(),
            demo_routes: false,
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        if !self.stream_path.starts_with('/') || self.stream_path.len() < 2 {
            return Err(StreamError::BadRequest(
                "gateway.stream_path must start with '/' and name a route".into(),
            ));
        }
        if RESERVED_PATHS.contains(&self.stream_path.as_str()) || self.stream_path.starts_with("/demo/") {
            return Err(StreamError::BadRequest(format!(
                "gateway.stream_path {} collides with a built-in route",
                self.stream_path
            )));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_stream_path() -> String {
    "/hystrix.stream".into()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeedSection {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Per-subscriber outbound queue depth.
    #[serde(default = "default_subscriber_buffer")]
    pub subscriber_buffer: usize,
}

impl Default for FeedSection {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            subscriber_buffer: default_subscriber_buffer(),
        }
    }
}

impl FeedSection {
    pub fn validate(&self) -> Result<()> {
        if !(10..=60_000).contains(&self.tick_interval_ms) {
            return Err(StreamError::BadRequest(
                "feed.tick_interval_ms must be between 10 and 60000".into(),
            ));
        }
        if !(1..=65_536).contains(&self.subscriber_buffer) {
            return Err(StreamError::BadRequest(
                "feed.subscriber_buffer must be between 1 and 65536".into(),
            ));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

fn default_tick_interval_ms() -> u64 {
    500
}
fn default_subscriber_buffer() -> usize {
    256
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatisticsSection {
    #[serde(default = "default_rolling_window_ms")]
    pub rolling_window_ms: u64,
}

impl Default for StatisticsSection {
    fn default() -> Self {
        Self {
            rolling_window_ms: default_rolling_window_ms(),
        }
    }
}

impl StatisticsSection {
    pub fn validate(&self) -> Result<()> {
        if !(1_000..=3_600_000).contains(&self.rolling_window_ms) {
            return Err(StreamError::BadRequest(
                "statistics.rolling_window_ms must be between 1000 and 3600000".into(),
            ));
        }
        Ok(())
    }

    pub fn rolling_window(&self) -> Duration {
        Duration::from_millis(self.rolling_window_ms)
    }
}

fn default_rolling_window_ms() -> u64 {
    15_000
}
