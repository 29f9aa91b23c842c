//! Directory-scoped scan lock
//!
//! At most one cleanup scan runs against a given upload root at a time within
//! the process, whether it was started by the scheduler or on demand. Roots
//! are keyed by their canonical path so `./uploads` and its absolute form
//! share a slot. Stats snapshots never take this lock.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex, PoisonError, TryLockError};

use tracing::debug;

type Slot = Arc<Mutex<()>>;

static SCAN_LOCKS: LazyLock<Mutex<HashMap<PathBuf, Slot>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

fn lock_key(root: &Path) -> PathBuf {
    std::fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf())
}

fn slot_for(root: &Path) -> Slot {
    let mut locks = SCAN_LOCKS.lock().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(locks.entry(lock_key(root)).or_default())
}

/// Runs `f` while holding the scan lock for `root`, blocking until it is free.
pub fn with_root_lock<T>(root: &Path, f: impl FnOnce() -> T) -> T {
    let slot = slot_for(root);
    let _guard = match slot.try_lock() {
        Ok(guard) => guard,
        Err(TryLockError::WouldBlock) => {
            debug!(root = %root.display(), "Waiting for in-flight cleanup scan");
            slot.lock().unwrap_or_else(PoisonError::into_inner)
        }
        // A panicking scan leaves nothing to repair; the slot only serializes.
        Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
    };
    f()
}

/// Whether a cleanup scan currently holds the lock for `root`.
#[cfg(test)]
fn is_scan_in_progress(root: &Path) -> bool {
    matches!(slot_for(root).try_lock(), Err(TryLockError::WouldBlock))
}
