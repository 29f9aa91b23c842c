//! Background cleanup scheduler
//!
//! One worker task per [`Scheduler`]. The worker runs a cleanup immediately,
//! then alternates between waiting one interval and running again. Runs are
//! sequential: the wait starts only after the previous scan returns, so the
//! effective period is "at most every interval" and drifts longer with slow
//! scans. There is no per-scan timeout.
//!
//! The wait is a `select!` on the shutdown channel, so [`Scheduler::stop`]
//! interrupts it right away. A scan already running on the blocking pool
//! cannot be interrupted; `stop` waits for it up to the stop timeout and then
//! returns anyway, leaving the worker to exit once the scan finishes.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::engine::CleanupEngine;
use super::error::{Result, RetentionError};
use super::policy::{RetentionPolicy, ScheduleConfig};
use super::report::CleanupReport;
use crate::config::CleanupConfig;
use crate::observability::RetentionMetrics;

pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// A unit of work the scheduler runs on every tick
pub trait CleanupTask: Send + Sync + 'static {
    fn run(&self) -> CleanupReport;

    /// Retention threshold, reported in the start log when known.
    fn max_age_days(&self) -> Option<u32> {
        None
    }
}

impl CleanupTask for CleanupEngine {
    fn run(&self) -> CleanupReport {
        self.cleanup_old_files()
    }

    fn max_age_days(&self) -> Option<u32> {
        Some(self.policy().max_age_days())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Running,
}

struct Worker {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

pub struct Scheduler {
    task: Arc<dyn CleanupTask>,
    schedule: ScheduleConfig,
    stop_timeout: Duration,
    metrics: Arc<RetentionMetrics>,
    state: SchedulerState,
    worker: Option<Worker>,
}

impl Scheduler {
    /// Scheduler cleaning `root` every `interval_hours`, deleting files older
    /// than `max_age_days`.
    pub fn new(root: impl Into<PathBuf>, max_age_days: u32, interval_hours: u32) -> Result<Self> {
        let engine = CleanupEngine::new(root, RetentionPolicy::new(max_age_days));
        let schedule = ScheduleConfig::from_hours(interval_hours)?;
        Ok(Self::with_task(Arc::new(engine), schedule))
    }

    pub fn with_task(task: Arc<dyn CleanupTask>, schedule: ScheduleConfig) -> Self {
        Self {
            task,
            schedule,
            stop_timeout: DEFAULT_STOP_TIMEOUT,
            metrics: Arc::new(RetentionMetrics::new()),
            state: SchedulerState::Stopped,
            worker: None,
        }
    }

    pub fn with_stop_timeout(mut self, stop_timeout: Duration) -> Self {
        self.stop_timeout = stop_timeout;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<RetentionMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> Arc<RetentionMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }

    /// Spawn the background worker. Must be called inside a Tokio runtime.
    ///
    /// A second call while running logs a warning and spawns nothing.
    pub fn start(&mut self) -> Result<()> {
        if self.is_running() {
            warn!("Cleanup scheduler is already running");
            return Ok(());
        }

        let runtime = Handle::try_current().map_err(|_| RetentionError::NoRuntime)?;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = runtime.spawn(run_worker(
            Arc::clone(&self.task),
            self.schedule.interval(),
            Arc::clone(&self.metrics),
            shutdown_rx,
        ));

        self.worker = Some(Worker {
            shutdown: shutdown_tx,
            handle,
        });
        self.state = SchedulerState::Running;

        info!(
            max_age_days = ?self.task.max_age_days(),
            interval_hours = self.schedule.interval_hours(),
            "Cleanup scheduler started"
        );
        Ok(())
    }

    /// Signal the worker and wait up to the stop timeout for it to exit.
    ///
    /// Calling this while stopped does nothing.
    pub async fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        self.state = SchedulerState::Stopped;

        // The receiver is gone only if the worker already exited.
        let _ = worker.shutdown.send(true);

        match tokio::time::timeout(self.stop_timeout, worker.handle).await {
            Ok(Ok(())) => info!("Cleanup scheduler stopped"),
            Ok(Err(err)) => error!(error = %err, "Cleanup worker terminated abnormally"),
            Err(_) => warn!(
                timeout_secs = self.stop_timeout.as_secs_f64(),
                "Cleanup worker still busy after stop timeout, detaching"
            ),
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if let Some(worker) = &self.worker {
            let _ = worker.shutdown.send(true);
        }
    }
}

async fn run_worker(
    task: Arc<dyn CleanupTask>,
    interval: Duration,
    metrics: Arc<RetentionMetrics>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        run_cycle(&task, &metrics).await;

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            // Fires on stop() or when the scheduler is dropped
            _ = shutdown.changed() => break,
        }

        if *shutdown.borrow() {
            break;
        }
    }
}

async fn run_cycle(task: &Arc<dyn CleanupTask>, metrics: &RetentionMetrics) {
    let run_id = Uuid::now_v7();
    metrics.run_started();
    info!(%run_id, "Starting scheduled cleanup");

    let task = Arc::clone(task);
    match tokio::task::spawn_blocking(move || task.run()).await {
        Ok(report) => {
            metrics.run_completed(&report);
            match &report.error {
                Some(err) => warn!(
                    %run_id,
                    error = %err,
                    deleted_count = report.deleted_count,
                    "Scheduled cleanup finished with error"
                ),
                None => info!(
                    %run_id,
                    deleted_count = report.deleted_count,
                    freed_space_mb = report.freed_space_mb,
                    errors = report.errors.len(),
                    "Scheduled cleanup completed"
                ),
            }
        }
        Err(err) => {
            metrics.run_failed();
            error!(%run_id, error = %err, "Scheduled cleanup failed");
        }
    }
}

/// Build and start the scheduler if cleanup is enabled.
///
/// Returns the owned handle; the caller stops it on shutdown.
pub fn init_scheduler(
    config: &CleanupConfig,
    root: &Path,
    metrics: Arc<RetentionMetrics>,
) -> Result<Option<Scheduler>> {
    if !config.enabled {
        info!("Cleanup scheduler is disabled");
        return Ok(None);
    }

    let mut scheduler = Scheduler::new(root, config.max_age_days, config.interval_hours)?
        .with_stop_timeout(config.stop_timeout())
        .with_metrics(metrics);
    scheduler.start()?;

    Ok(Some(scheduler))
}
