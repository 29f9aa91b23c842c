use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use super::{
    models::{CleanupParams, HealthResponse},
    state::AppState,
};
use crate::api::error::ApiError;
use crate::retention::{self, CleanupReport, StorageStats};

/// On-demand cleanup (POST /admin/storage/cleanup)
///
/// Runs a fresh cleanup against the upload root, optionally with a
/// `max_age_days` override, and returns the report. The response is always
/// 200: failures are described inside the report's `error`/`errors` fields.
/// Concurrent scheduled scans of the same root are serialized by the scan
/// lock.
pub async fn trigger_cleanup(
    State(state): State<AppState>,
    Query(params): Query<CleanupParams>,
) -> Json<CleanupReport> {
    let root = state.config.uploads.root.clone();
    let max_age_days = params
        .max_age_days
        .unwrap_or(state.config.cleanup.max_age_days);

    info!(root = %root.display(), max_age_days, "Manual cleanup requested");

    let report = tokio::task::spawn_blocking(move || {
        retention::trigger_cleanup(&root, Some(max_age_days))
    })
    .await
    .unwrap_or_else(|err| CleanupReport {
        deleted_count: 0,
        freed_space_mb: 0.0,
        max_age_days,
        errors: Vec::new(),
        error: Some(format!("Cleanup task failed: {err}")),
    });

    Json(report)
}

/// Storage snapshot (GET /admin/storage/stats)
pub async fn storage_stats(State(state): State<AppState>) -> Result<Json<StorageStats>, ApiError> {
    let root = state.config.uploads.root.clone();
    let stats = tokio::task::spawn_blocking(move || retention::get_stats(&root)).await?;

    Ok(Json(stats))
}

/// Health check endpoint (GET /health)
///
/// Reports whether the background scheduler was started and its run counters.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        scheduler: state.scheduler,
        metrics: state.metrics.snapshot(),
    };

    (StatusCode::OK, Json(response))
}
