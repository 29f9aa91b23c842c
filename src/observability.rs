//! Counters for the background cleanup scheduler

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::retention::CleanupReport;

/// Metrics handle shared between the scheduler worker and the health endpoint
#[derive(Debug, Default)]
pub struct RetentionMetrics {
    runs_started: AtomicU64,
    runs_failed: AtomicU64,
    files_deleted: AtomicU64,
    /// Freed space in hundredths of a MB, matching report precision
    freed_space_centi_mb: AtomicU64,
    entry_errors: AtomicU64,
    /// Unix millis of the last finished run, 0 if none
    last_run_at_ms: AtomicI64,
}

impl RetentionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run_started(&self) {
        self.runs_started.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "runs_started", "Metric incremented");
    }

    pub fn run_failed(&self) {
        self.runs_failed.fetch_add(1, Ordering::Relaxed);
        self.touch();
        tracing::debug!(counter = "runs_failed", "Metric incremented");
    }

    pub fn run_completed(&self, report: &CleanupReport) {
        self.files_deleted
            .fetch_add(report.deleted_count, Ordering::Relaxed);
        self.freed_space_centi_mb
            .fetch_add((report.freed_space_mb * 100.0).round() as u64, Ordering::Relaxed);
        self.entry_errors
            .fetch_add(report.errors.len() as u64, Ordering::Relaxed);
        self.touch();
    }

    fn touch(&self) {
        self.last_run_at_ms
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let last_run_at = match self.last_run_at_ms.load(Ordering::Relaxed) {
            0 => None,
            millis => DateTime::from_timestamp_millis(millis),
        };

        MetricsSnapshot {
            runs_started: self.runs_started.load(Ordering::Relaxed),
            runs_failed: self.runs_failed.load(Ordering::Relaxed),
            files_deleted: self.files_deleted.load(Ordering::Relaxed),
            freed_space_mb: self.freed_space_centi_mb.load(Ordering::Relaxed) as f64 / 100.0,
            entry_errors: self.entry_errors.load(Ordering::Relaxed),
            last_run_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub runs_started: u64,
    pub runs_failed: u64,
    pub files_deleted: u64,
    pub freed_space_mb: f64,
    pub entry_errors: u64,
    pub last_run_at: Option<DateTime<Utc>>,
}
