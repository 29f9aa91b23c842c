//! Request and response shapes for the admin endpoints.
//!
//! Cleanup and stats responses are the [`CleanupReport`] and [`StorageStats`]
//! records themselves, serialized as-is:
//!
//! ```json
//! {
//!   "deleted_count": 4,
//!   "freed_space_mb": 12.37,
//!   "max_age_days": 7,
//!   "errors": ["Error deleting /srv/uploads/a.wav: Permission denied (os error 13)"]
//! }
//! ```
//!
//! [`CleanupReport`]: crate::retention::CleanupReport
//! [`StorageStats`]: crate::retention::StorageStats

use serde::{Deserialize, Serialize};

use crate::observability::MetricsSnapshot;

/// Query for `POST /admin/storage/cleanup`
#[derive(Debug, Default, Deserialize)]
pub struct CleanupParams {
    /// Overrides the configured retention age for this request only
    pub max_age_days: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerStatus {
    Running,
    Disabled,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub scheduler: SchedulerStatus,
    pub metrics: MetricsSnapshot,
}
