use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, routing::get, routing::post};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::{
    models::SchedulerStatus,
    services::{health, storage_stats, trigger_cleanup},
    state::AppState,
};
use crate::config::Config;
use crate::observability::RetentionMetrics;
use crate::retention::init_scheduler;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Build the admin router over the given state
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/admin/storage/cleanup", post(trigger_cleanup))
        .route("/admin/storage/stats", get(storage_stats))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Serve the admin API until Ctrl+C/SIGTERM, running the cleanup scheduler
/// alongside when enabled.
pub async fn run(address: Option<SocketAddr>) -> Result<(), AnyError> {
    info!("Loading configuration");
    let config = Config::load().map_err(|e| format!("Failed to load config: {}", e))?;
    let address = address.unwrap_or(config.server.bind_addr);

    let metrics = Arc::new(RetentionMetrics::new());
    let mut scheduler = init_scheduler(&config.cleanup, &config.uploads.root, Arc::clone(&metrics))
        .map_err(|e| format!("Failed to start cleanup scheduler: {}", e))?;

    let status = if scheduler.is_some() {
        SchedulerStatus::Running
    } else {
        SchedulerStatus::Disabled
    };
    let app = router(AppState::new(config, metrics, status));

    let listener = TcpListener::bind(address).await?;
    info!(%address, "sweepbox API listening");

    let served = axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await;

    if let Some(scheduler) = scheduler.as_mut() {
        scheduler.stop().await;
    }

    served?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = signal(SignalKind::terminate())
            .expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
