//! Upload directory cleanup and storage statistics
//!
//! [`CleanupEngine`] owns nothing but a root path and a [`RetentionPolicy`].
//! Each call walks the tree afresh and returns a new report; nothing is
//! cached between calls.
//!
//! Failure handling is layered:
//! - a missing root yields a zero report with `error` set,
//! - a failure on one entry becomes a string in `errors` and the scan goes on,
//! - a failure to read the root itself stops the walk and returns the partial
//!   counts with `error` set.
//!
//! Deletion uses a strict comparison: a file modified exactly at the cutoff
//! is retained.
//!
//! Symlinks are not descended into, but a link that resolves to a regular
//! file counts as a file: its target's age and size decide, and deleting it
//! removes the link only. Dangling links are ignored.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, error, info, warn};
use walkdir::{DirEntry, WalkDir};

use super::error::RetentionError;
use super::lock::with_root_lock;
use super::policy::{RetentionPolicy, SECONDS_PER_DAY};
use super::report::{CleanupReport, StorageStats, bytes_to_mb, round_to};

/// Result of visiting one regular file during a cleanup scan
#[derive(Debug)]
enum EntryOutcome {
    Retained,
    Deleted { bytes: u64 },
    Failed(RetentionError),
}

/// Running totals for one cleanup scan
#[derive(Debug, Default)]
struct Sweep {
    deleted_count: u64,
    freed_bytes: u64,
    errors: Vec<String>,
}

impl Sweep {
    fn record(&mut self, outcome: EntryOutcome) {
        match outcome {
            EntryOutcome::Retained => {}
            EntryOutcome::Deleted { bytes } => {
                self.deleted_count += 1;
                self.freed_bytes += bytes;
            }
            EntryOutcome::Failed(err) => {
                let message = err.to_string();
                error!(error = %message, "Cleanup entry failed");
                self.errors.push(message);
            }
        }
    }

    fn into_report(self, max_age_days: u32, error: Option<String>) -> CleanupReport {
        CleanupReport {
            deleted_count: self.deleted_count,
            freed_space_mb: bytes_to_mb(self.freed_bytes),
            max_age_days,
            errors: self.errors,
            error,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CleanupEngine {
    root: PathBuf,
    policy: RetentionPolicy,
}

impl CleanupEngine {
    pub fn new(root: impl Into<PathBuf>, policy: RetentionPolicy) -> Self {
        Self {
            root: root.into(),
            policy,
        }
    }

    pub fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    /// Delete files older than the retention policy and prune empty directories.
    ///
    /// Never fails: every error is reported inside the returned
    /// [`CleanupReport`].
    pub fn cleanup_old_files(&self) -> CleanupReport {
        self.cleanup_at(SystemTime::now())
    }

    pub(crate) fn cleanup_at(&self, now: SystemTime) -> CleanupReport {
        let max_age_days = self.policy.max_age_days();

        if !self.root.exists() {
            warn!(root = %self.root.display(), "Upload folder does not exist");
            let err = RetentionError::MissingRoot {
                path: self.root.clone(),
            };
            return CleanupReport::failed(max_age_days, err.to_string());
        }
        if !self.root.is_dir() {
            let err = RetentionError::NotADirectory {
                path: self.root.clone(),
            };
            warn!(error = %err, "Cleanup skipped");
            return CleanupReport::failed(max_age_days, err.to_string());
        }

        with_root_lock(&self.root, || self.sweep(now))
    }

    fn sweep(&self, now: SystemTime) -> CleanupReport {
        self.sweep_entries(WalkDir::new(&self.root).min_depth(1).follow_links(false), now)
    }

    fn sweep_entries<I>(&self, entries: I, now: SystemTime) -> CleanupReport
    where
        I: IntoIterator<Item = walkdir::Result<DirEntry>>,
    {
        let cutoff = self.policy.cutoff(now);
        let mut sweep = Sweep::default();
        let mut dirs: Vec<(usize, PathBuf)> = Vec::new();

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    let err = RetentionError::Walk {
                        path: self.root.clone(),
                        source: err,
                    };
                    error!(error = %err, "Cleanup failed");
                    return sweep.into_report(self.policy.max_age_days(), Some(err.to_string()));
                }
                Err(err) => {
                    let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| self.root.clone());
                    sweep.record(EntryOutcome::Failed(RetentionError::Walk { path, source: err }));
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                dirs.push((entry.depth(), entry.into_path()));
            } else if is_file_like(&entry) {
                sweep.record(sweep_file(&entry, now, cutoff));
            }
        }

        prune_empty_dirs(dirs);

        let report = sweep.into_report(self.policy.max_age_days(), None);
        info!(
            root = %self.root.display(),
            deleted_count = report.deleted_count,
            freed_space_mb = report.freed_space_mb,
            errors = report.errors.len(),
            "Cleanup completed"
        );
        report
    }

    /// Summarize file count, total size, and oldest file age. Read-only.
    pub fn get_storage_stats(&self) -> StorageStats {
        if !self.root.is_dir() {
            return StorageStats::default();
        }

        let now = SystemTime::now();
        let mut total_files = 0u64;
        let mut total_bytes = 0u64;
        let mut oldest: Option<SystemTime> = None;

        for entry in WalkDir::new(&self.root).min_depth(1).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    debug!(error = %err, "Skipping unreadable entry in stats scan");
                    continue;
                }
            };
            if !is_file_like(&entry) {
                continue;
            }
            // Deleted between listing and stat
            let Ok(metadata) = fs::metadata(entry.path()) else {
                continue;
            };

            total_files += 1;
            total_bytes += metadata.len();
            if let Ok(modified) = metadata.modified() {
                oldest = Some(oldest.map_or(modified, |current| current.min(modified)));
            }
        }

        let oldest_file_age_days = match oldest {
            Some(modified) if total_files > 0 => round_to(age_days(now, modified), 1),
            _ => 0.0,
        };

        StorageStats {
            total_files,
            total_size_mb: bytes_to_mb(total_bytes),
            oldest_file_age_days,
        }
    }
}

/// Regular files and symlinks resolving to one.
fn is_file_like(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    file_type.is_file() || (file_type.is_symlink() && entry.path().is_file())
}

fn age_days(now: SystemTime, modified: SystemTime) -> f64 {
    now.duration_since(modified)
        .map(|age| age.as_secs_f64() / SECONDS_PER_DAY as f64)
        .unwrap_or(0.0)
}

fn sweep_file(entry: &DirEntry, now: SystemTime, cutoff: SystemTime) -> EntryOutcome {
    let path = entry.path();

    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(err) => return EntryOutcome::Failed(RetentionError::io("reading", path, err)),
    };
    let modified = match metadata.modified() {
        Ok(modified) => modified,
        Err(err) => return EntryOutcome::Failed(RetentionError::io("reading", path, err)),
    };

    if modified >= cutoff {
        return EntryOutcome::Retained;
    }

    match fs::remove_file(path) {
        Ok(()) => {
            info!(
                file = %entry.file_name().to_string_lossy(),
                age_days = %format!("{:.1}", age_days(now, modified)),
                "Deleted old file"
            );
            EntryOutcome::Deleted {
                bytes: metadata.len(),
            }
        }
        Err(err) => EntryOutcome::Failed(RetentionError::io("deleting", path, err)),
    }
}

/// Remove empty directories deepest-first so emptied parents go in the same pass.
fn prune_empty_dirs(mut dirs: Vec<(usize, PathBuf)>) {
    dirs.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));

    for (_, dir) in dirs {
        let is_empty = match fs::read_dir(&dir) {
            Ok(mut entries) => entries.next().is_none(),
            Err(err) => {
                debug!(dir = %dir.display(), error = %err, "Skipping unreadable directory");
                continue;
            }
        };
        if !is_empty {
            continue;
        }

        match fs::remove_dir(&dir) {
            Ok(()) => info!(dir = %dir.display(), "Removed empty directory"),
            Err(err) => error!(dir = %dir.display(), error = %err, "Error removing directory"),
        }
    }
}

/// One-shot cleanup with a fresh engine, as used by on-demand admin requests.
pub fn trigger_cleanup(root: impl AsRef<Path>, max_age_days: Option<u32>) -> CleanupReport {
    let policy = max_age_days.map_or_else(RetentionPolicy::default, RetentionPolicy::new);
    CleanupEngine::new(root.as_ref(), policy).cleanup_old_files()
}

/// Read-only storage snapshot of `root`.
pub fn get_stats(root: impl AsRef<Path>) -> StorageStats {
    CleanupEngine::new(root.as_ref(), RetentionPolicy::default()).get_storage_stats()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::{Duration, UNIX_EPOCH};
    use tempfile::TempDir;

    fn days(n: u64) -> Duration {
        Duration::from_secs(n * SECONDS_PER_DAY)
    }

    fn write_aged(root: &Path, rel: &str, size: usize, modified: SystemTime) -> PathBuf {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, vec![0u8; size]).unwrap();
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(modified)
            .unwrap();
        path
    }

    fn write_file(root: &Path, rel: &str, size: usize, age: Duration) -> PathBuf {
        write_aged(root, rel, size, SystemTime::now() - age)
    }

    #[test]
    fn test_deletes_only_files_past_retention() {
        let temp_dir = TempDir::new().unwrap();
        let old = write_file(temp_dir.path(), "file_a.wav", 10, days(10));
        let recent = write_file(temp_dir.path(), "file_b.wav", 10, days(3));

        let engine = CleanupEngine::new(temp_dir.path(), RetentionPolicy::new(7));
        let report = engine.cleanup_old_files();

        assert_eq!(report.deleted_count, 1);
        assert_eq!(report.max_age_days, 7);
        assert!(report.is_clean());
        assert!(!old.exists());
        assert!(recent.exists());
    }

    #[test]
    fn test_freed_space_sums_deleted_sizes() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "a.mp3", 1024 * 1024, days(30));
        write_file(temp_dir.path(), "nested/b.mp3", 512 * 1024, days(30));
        write_file(temp_dir.path(), "c.mp3", 4 * 1024 * 1024, days(1));

        let report = CleanupEngine::new(temp_dir.path(), RetentionPolicy::new(7)).cleanup_old_files();

        assert_eq!(report.deleted_count, 2);
        assert_eq!(report.freed_space_mb, 1.5);
    }

    #[test]
    fn test_file_at_cutoff_is_retained() {
        let temp_dir = TempDir::new().unwrap();
        let now = UNIX_EPOCH + Duration::from_secs(1_750_000_000);
        let at_cutoff = write_aged(temp_dir.path(), "edge.webm", 1, now - days(7));
        let past_cutoff = write_aged(temp_dir.path(), "past.webm", 1, now - days(7) - Duration::from_secs(1));

        let report = CleanupEngine::new(temp_dir.path(), RetentionPolicy::new(7)).cleanup_at(now);

        assert_eq!(report.deleted_count, 1);
        assert!(at_cutoff.exists());
        assert!(!past_cutoff.exists());
    }

    #[test]
    fn test_missing_root_reports_error() {
        let temp_dir = TempDir::new().unwrap();
        let engine = CleanupEngine::new(temp_dir.path().join("missing"), RetentionPolicy::new(7));

        let report = engine.cleanup_old_files();

        assert_eq!(report.deleted_count, 0);
        assert_eq!(report.freed_space_mb, 0.0);
        assert_eq!(report.error.as_deref(), Some("Upload folder does not exist"));
    }

    #[test]
    fn test_root_that_is_a_file_reports_error() {
        let temp_dir = TempDir::new().unwrap();
        let file = write_file(temp_dir.path(), "not-a-dir", 4, days(30));

        let report = CleanupEngine::new(&file, RetentionPolicy::new(7)).cleanup_old_files();

        assert_eq!(report.deleted_count, 0);
        assert!(report.error.is_some());
        assert!(file.exists());
    }

    #[test]
    fn test_second_run_deletes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "old.wav", 100, days(10));
        write_file(temp_dir.path(), "keep.wav", 100, days(1));
        let engine = CleanupEngine::new(temp_dir.path(), RetentionPolicy::new(7));

        assert_eq!(engine.cleanup_old_files().deleted_count, 1);
        let second = engine.cleanup_old_files();
        assert_eq!(second.deleted_count, 0);
        assert_eq!(second.freed_space_mb, 0.0);
    }

    #[test]
    fn test_prunes_directory_emptied_by_cleanup() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "session-1/file_a.wav", 10, days(10));

        let report = CleanupEngine::new(temp_dir.path(), RetentionPolicy::new(7)).cleanup_old_files();

        assert_eq!(report.deleted_count, 1);
        assert!(!temp_dir.path().join("session-1").exists());
        assert!(temp_dir.path().exists());
    }

    #[test]
    fn test_prunes_nested_chain_deepest_first() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "a/b/c/old.wav", 10, days(10));
        write_file(temp_dir.path(), "a/keep.wav", 10, days(1));
        fs::create_dir_all(temp_dir.path().join("empty/inner")).unwrap();

        CleanupEngine::new(temp_dir.path(), RetentionPolicy::new(7)).cleanup_old_files();

        assert!(!temp_dir.path().join("a/b").exists());
        assert!(temp_dir.path().join("a/keep.wav").exists());
        assert!(!temp_dir.path().join("empty").exists());
    }

    #[test]
    fn test_sweep_collects_failures_and_keeps_counting() {
        let mut sweep = Sweep::default();
        sweep.record(EntryOutcome::Deleted { bytes: 1024 * 1024 });
        sweep.record(EntryOutcome::Failed(RetentionError::io(
            "deleting",
            "/uploads/locked.wav",
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        )));
        sweep.record(EntryOutcome::Retained);
        sweep.record(EntryOutcome::Deleted { bytes: 1024 * 1024 });

        let report = sweep.into_report(7, None);

        assert_eq!(report.deleted_count, 2);
        assert_eq!(report.freed_space_mb, 2.0);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("Error deleting /uploads/locked.wav"));
        assert!(report.error.is_none());
    }

    #[test]
    fn test_aborted_sweep_keeps_partial_counts() {
        let mut sweep = Sweep::default();
        sweep.record(EntryOutcome::Deleted { bytes: 2 * 1024 * 1024 });

        let report = sweep.into_report(3, Some("scan aborted".to_string()));

        assert_eq!(report.deleted_count, 1);
        assert_eq!(report.freed_space_mb, 2.0);
        assert_eq!(report.max_age_days, 3);
        assert_eq!(report.error.as_deref(), Some("scan aborted"));
    }

    #[test]
    fn test_root_walk_error_keeps_partial_counts_and_skips_pruning() {
        let temp_dir = TempDir::new().unwrap();
        let old = write_file(temp_dir.path(), "old.wav", 1024 * 1024, days(10));
        let empty = temp_dir.path().join("empty");
        fs::create_dir(&empty).unwrap();

        let mut entries: Vec<_> = WalkDir::new(temp_dir.path()).min_depth(1).into_iter().collect();
        let root_failure = WalkDir::new(temp_dir.path().join("missing"))
            .into_iter()
            .next()
            .unwrap();
        assert_eq!(root_failure.as_ref().unwrap_err().depth(), 0);
        entries.push(root_failure);

        let engine = CleanupEngine::new(temp_dir.path(), RetentionPolicy::new(7));
        let report = engine.sweep_entries(entries, SystemTime::now());

        assert_eq!(report.deleted_count, 1);
        assert_eq!(report.freed_space_mb, 1.0);
        assert!(report.error.is_some());
        assert!(!old.exists());
        assert!(empty.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_root_aborts_cleanup_and_reports_empty_stats() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("uploads");
        let old = write_file(&root, "old.wav", 10, days(10));
        fs::set_permissions(&root, fs::Permissions::from_mode(0o000)).unwrap();

        // Root ignores mode bits
        if fs::read_dir(&root).is_ok() {
            fs::set_permissions(&root, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let engine = CleanupEngine::new(&root, RetentionPolicy::new(7));
        let report = engine.cleanup_old_files();
        let stats = engine.get_storage_stats();
        fs::set_permissions(&root, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(report.deleted_count, 0);
        assert!(report.error.is_some());
        assert_eq!(stats, StorageStats::default());
        assert!(old.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_file_is_counted_and_unlinked() {
        let uploads = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();
        let target = write_file(elsewhere.path(), "target.wav", 1024 * 1024, days(10));
        let link = uploads.path().join("link.wav");
        std::os::unix::fs::symlink(&target, &link).unwrap();
        let dangling = uploads.path().join("dangling.wav");
        std::os::unix::fs::symlink(elsewhere.path().join("gone.wav"), &dangling).unwrap();

        let stats = get_stats(uploads.path());
        assert_eq!(stats.total_files, 1);
        assert_eq!(stats.total_size_mb, 1.0);

        let report = trigger_cleanup(uploads.path(), None);
        assert_eq!(report.deleted_count, 1);
        assert!(report.is_clean());
        assert!(fs::symlink_metadata(&link).is_err());
        assert!(fs::symlink_metadata(&dangling).is_ok());
        assert!(target.exists());
    }

    #[test]
    fn test_stats_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let stats = CleanupEngine::new(temp_dir.path(), RetentionPolicy::default()).get_storage_stats();

        assert_eq!(stats, StorageStats::default());
    }

    #[test]
    fn test_stats_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let stats = get_stats(temp_dir.path().join("missing"));

        assert_eq!(stats.total_files, 0);
        assert_eq!(stats.total_size_mb, 0.0);
        assert_eq!(stats.oldest_file_age_days, 0.0);
    }

    #[test]
    fn test_stats_counts_without_deleting() {
        let temp_dir = TempDir::new().unwrap();
        let old = write_file(temp_dir.path(), "old.wav", 1024 * 1024, days(10));
        let recent = write_file(temp_dir.path(), "deep/recent.wav", 1024 * 1024, days(2));

        let stats = get_stats(temp_dir.path());

        assert_eq!(stats.total_files, 2);
        assert_eq!(stats.total_size_mb, 2.0);
        assert_eq!(stats.oldest_file_age_days, 10.0);
        assert!(old.exists());
        assert!(recent.exists());
    }

    #[test]
    fn test_trigger_cleanup_uses_override() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "three_days.wav", 10, days(3));

        let default_report = trigger_cleanup(temp_dir.path(), None);
        assert_eq!(default_report.deleted_count, 0);
        assert_eq!(default_report.max_age_days, 7);

        let override_report = trigger_cleanup(temp_dir.path(), Some(2));
        assert_eq!(override_report.deleted_count, 1);
        assert_eq!(override_report.max_age_days, 2);
    }
}
