//! SSE subscription endpoint.
//!
//! Each connection gets a bounded queue. The broadcaster pushes into it with
//! `try_send`, so a client that stops reading fails fast with `SinkFull` and
//! is dropped instead of stalling the feed.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{sse::Event, IntoResponse, Response, Sse},
};
use futures_util::stream;
use tokio::sync::mpsc::{self, error::TrySendError};

use retrystream_core::error::{Result, StreamError};
use retrystream_core::Frame;

use crate::app_state::AppState;
use crate::feed::{Sink, SubscriberId, SubscriberRegistry};
use crate::transport::codec;

/// Sink bound to one SSE connection.
pub struct SseSink {
    tx: mpsc::Sender<Event>,
}

impl SseSink {
    pub fn new(tx: mpsc::Sender<Event>) -> Self {
        Self { tx }
    }
}

impl Sink for SseSink {
    fn send(&self, frame: &Frame) -> Result<()> {
        let event = codec::encode(frame)?;
        self.tx.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) => StreamError::SinkFull,
            TrySendError::Closed(_) => StreamError::SinkClosed,
        })
    }
}

/// Deregisters the subscriber when the response stream is dropped.
struct Subscription {
    registry: Arc<SubscriberRegistry>,
    id: SubscriberId,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.registry.remove(self.id) {
            tracing::debug!(subscriber = self.id, "subscriber disconnected");
        }
    }
}

pub async fn subscribe(State(app): State<AppState>) -> Response {
    let broadcaster = app.broadcaster();
    let (tx, rx) = mpsc::channel::<Event>(app.cfg().feed.subscriber_buffer);
    let Some(subscriber) = broadcaster.subscribe(Arc::new(SseSink::new(tx))) else {
        broadcaster.metrics().subscriptions.inc(&[("outcome", "rejected")]);
        return (StatusCode::SERVICE_UNAVAILABLE, "metrics feed stopped").into_response();
    };

    let registry = Arc::clone(broadcaster.registry());
    let id = subscriber.id();
    broadcaster.metrics().subscriptions.inc(&[("outcome", "accepted")]);
    tracing::debug!(subscriber = id, "subscriber attached");

    let guard = Subscription { registry, id };
    let events = stream::unfold((rx, guard), |(mut rx, guard)| async move {
        let event = rx.recv().await?;
        Some((Ok::<Event, Infallible>(event), (rx, guard)))
    });

    (
        [
            (header::CACHE_CONTROL, "no-cache, no-store, max-age=0, must-revalidate"),
            (header::PRAGMA, "no-cache"),
        ],
        Sse::new(events),
    )
        .into_response()
}
