//! Retention and schedule value objects
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::error::{Result, RetentionError};

pub const SECONDS_PER_DAY: u64 = 24 * 60 * 60;
pub const SECONDS_PER_HOUR: u64 = 60 * 60;

pub const DEFAULT_MAX_AGE_DAYS: u32 = 7;
pub const DEFAULT_INTERVAL_HOURS: u32 = 24;

/// Maximum age a file may reach before it becomes eligible for deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    max_age_days: u32,
}

impl RetentionPolicy {
    pub const fn new(max_age_days: u32) -> Self {
        Self { max_age_days }
    }

    pub fn max_age_days(&self) -> u32 {
        self.max_age_days
    }

    pub fn max_age_seconds(&self) -> u64 {
        u64::from(self.max_age_days) * SECONDS_PER_DAY
    }

    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_seconds())
    }

    /// Files modified strictly before this instant are deleted. Never earlier
    /// than the Unix epoch.
    pub fn cutoff(&self, now: SystemTime) -> SystemTime {
        now.checked_sub(self.max_age())
            .filter(|cutoff| *cutoff >= UNIX_EPOCH)
            .unwrap_or(UNIX_EPOCH)
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_AGE_DAYS)
    }
}

/// Period between scheduled cleanup runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleConfig {
    interval: Duration,
}

impl ScheduleConfig {
    pub fn new(interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(RetentionError::InvalidInterval);
        }
        Ok(Self { interval })
    }

    pub fn from_hours(interval_hours: u32) -> Result<Self> {
        Self::new(Duration::from_secs(
            u64::from(interval_hours) * SECONDS_PER_HOUR,
        ))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn interval_seconds(&self) -> u64 {
        self.interval.as_secs()
    }

    pub fn interval_hours(&self) -> f64 {
        self.interval.as_secs_f64() / SECONDS_PER_HOUR as f64
    }
}
