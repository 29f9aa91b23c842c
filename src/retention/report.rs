//! Report records returned by cleanup and stats calls

use serde::{Deserialize, Serialize};

pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Rounds half away from zero to the given number of decimals.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Converts bytes to megabytes, rounded to 2 decimals.
pub fn bytes_to_mb(bytes: u64) -> f64 {
    round_to(bytes as f64 / BYTES_PER_MB, 2)
}

/// Outcome of a single `cleanup_old_files` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanupReport {
    pub deleted_count: u64,
    pub freed_space_mb: f64,
    pub max_age_days: u32,
    /// Per-entry failures, in scan order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    /// Set when the scan itself could not proceed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CleanupReport {
    pub(crate) fn failed(max_age_days: u32, error: impl Into<String>) -> Self {
        Self {
            deleted_count: 0,
            freed_space_mb: 0.0,
            max_age_days,
            errors: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// True when neither per-entry nor scan-level errors occurred.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.error.is_none()
    }
}

/// Point-in-time summary of the upload root
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StorageStats {
    pub total_files: u64,
    pub total_size_mb: f64,
    pub oldest_file_age_days: f64,
}
