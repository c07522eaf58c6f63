use std::sync::{Mutex, MutexGuard};

use tracing::warn;

/// Lock `lock`, recovering the guard if a previous holder panicked.
///
/// Cached pages are recomputable, so a poisoned map is still safe to serve
/// and overwrite.
pub(crate) fn lock_recovering<'a, T>(lock: &'a Mutex<T>, op: &'static str) -> MutexGuard<'a, T> {
    match lock.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!(
                target = "yatube::cache",
                op,
                lock_kind = "mutex.lock",
                result = "poisoned_recovered",
                "Recovered from poisoned page cache lock"
            );
            poisoned.into_inner()
        }
    }
}
