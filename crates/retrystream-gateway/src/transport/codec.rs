use axum::response::sse::Event;

use retrystream_core::error::{Result, StreamError};
use retrystream_core::Frame;

/// Event name used for keep-alives.
pub const PING_EVENT: &str = "ping";

/// Metric records become `data:` events carrying the JSON record; keep-alives
/// become a bare `event: ping`.
pub fn encode(frame: &Frame) -> Result<Event> {
    match frame {
        Frame::Metric(record) => Event::default()
            .json_data(record)
            .map_err(|e| StreamError::Encode(e.to_string())),
        Frame::Ping => Ok(Event::default().event(PING_EVENT)),
    }
}
