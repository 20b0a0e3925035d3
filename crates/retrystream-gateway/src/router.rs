//! Axum router wiring.
//!
//! The SSE feed lives at the configured `stream_path`; ops routes are fixed.

use axum::{routing::get, Router};

use crate::{app_state::AppState, ops, services, transport};

/// Paths the feed route may not shadow.
pub const RESERVED_PATHS: [&str; 4] = ["/stats", "/healthz", "/readyz", "/metrics"];

pub fn build_router(state: AppState) -> Router {
    let mut router: Router<AppState> = Router::new()
        .route(&state.cfg().gateway.stream_path, get(transport::sse::subscribe))
        .route("/stats", get(ops::stats))
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics));

    if state.cfg().gateway.demo_routes {
        router = router
            .route("/demo/ok", get(services::demo::ok))
            .route("/demo/fail", get(services::demo::fail))
            .route("/demo/recover", get(services::demo::recover));
    }

    router.with_state(state)
}
