//! Demo routes that drive the repository like a circuit-breaker-protected
//! operation named `home`. Mounted only when `gateway.demo_routes` is set.

use axum::{extract::State, http::StatusCode};

use crate::app_state::AppState;

pub const DEMO_LABEL: &str = "home";

/// Call succeeded first time.
pub async fn ok(State(app): State<AppState>) -> &'static str {
    let repo = app.repository();
    repo.record_started(DEMO_LABEL);
    repo.record_complete(DEMO_LABEL);
    "ok"
}

/// Call failed with no fallback available.
pub async fn fail(State(app): State<AppState>) -> (StatusCode, &'static str) {
    let repo = app.repository();
    repo.record_started(DEMO_LABEL);
    repo.record_error(DEMO_LABEL);
    repo.record_abort(DEMO_LABEL);
    (StatusCode::INTERNAL_SERVER_ERROR, "Planned")
}

/// Call failed and the fallback answered.
pub async fn recover(State(app): State<AppState>) -> &'static str {
    let repo = app.repository();
    repo.record_started(DEMO_LABEL);
    repo.record_error(DEMO_LABEL);
    repo.record_recovery(DEMO_LABEL);
    "Recovery"
}
