//! retrystream gateway
//!
//! - SSE metrics feed: GET /hystrix.stream (configurable)
//! - Statistics snapshot: GET /stats
//! - Ops: /healthz, /readyz, /metrics
//! - Graceful shutdown stops the feed first so open streams can finish

use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};

use retrystream_gateway::{app_state::AppState, config, router};

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let path = std::env::var("RETRYSTREAM_CONFIG").unwrap_or_else(|_| "retrystream.yaml".into());
    let cfg = config::load_from_file(&path).expect("config load failed");
    let listen: SocketAddr = cfg
        .gateway
        .listen
        .parse()
        .expect("gateway.listen must be a valid SocketAddr");

    let state = AppState::new(cfg).expect("app state init failed");
    state.broadcaster().start();
    let app = router::build_router(state.clone());

    tracing::info!(%listen, stream_path = %state.cfg().gateway.stream_path, "retrystream-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen).await.expect("failed to bind");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .expect("server failed");
}

/// Wait for a termination signal, then stop the feed. Stopping drops every
/// subscriber, which ends their SSE streams and lets the server drain.
async fn shutdown_signal(state: AppState) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, stopping metrics feed");
    state.broadcaster().shutdown().await;
}
