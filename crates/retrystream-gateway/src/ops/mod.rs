//! Operational HTTP endpoints.
//!
//! - `/healthz` : liveness
//! - `/readyz`  : readiness (503 while the feed is stopped)
//! - `/metrics` : Prometheus text format
//! - `/stats`   : current statistic snapshots as JSON

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::app_state::AppState;

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    if state.broadcaster().is_running() {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "stopped")
    }
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let gauges = state.metrics_gauges();
    let body = state.broadcaster().metrics().render(&gauges);

    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response()
}

pub async fn stats(State(state): State<AppState>) -> Response {
    Json(state.repository().list_all_at(std::time::Instant::now())).into_response()
}
