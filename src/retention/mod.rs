//! Upload retention: age-based cleanup of the upload directory
//!
//! This module keeps the upload root from growing without bound. It provides:
//!
//! - [`CleanupEngine`]: deletes files past the retention age, prunes emptied
//!   directories, and reports storage statistics
//! - [`Scheduler`]: a single background worker running the engine on a fixed
//!   interval with explicit `start`/`stop`
//! - [`trigger_cleanup`] / [`get_stats`]: synchronous entry points for
//!   on-demand admin requests
//!
//! ## Concurrency
//!
//! Scheduled and on-demand cleanups may target the same root. Scans are
//! serialized per root by [`lock::with_root_lock`]; stats snapshots are not
//! locked and may observe a concurrent delete.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sweepbox::retention::{Scheduler, trigger_cleanup};
//!
//! let mut scheduler = Scheduler::new("./uploads", 7, 24)?;
//! scheduler.start()?;
//! let report = trigger_cleanup("./uploads", Some(1));
//! scheduler.stop().await;
//! ```

pub mod engine;
pub mod error;
pub mod lock;
pub mod policy;
pub mod report;
pub mod scheduler;

pub use engine::{CleanupEngine, get_stats, trigger_cleanup};
pub use error::{Result, RetentionError};
pub use policy::{DEFAULT_INTERVAL_HOURS, DEFAULT_MAX_AGE_DAYS, RetentionPolicy, ScheduleConfig};
pub use report::{CleanupReport, StorageStats};
pub use scheduler::{CleanupTask, Scheduler, SchedulerState, init_scheduler};
