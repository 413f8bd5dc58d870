//! Per-resource lock registry.
//!
//! Every mutation of a list document holds the lock for that document's
//! path for one full read-modify-write cycle. Mutations of different lists
//! never contend; mutations of the same list queue in arrival order.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Guard held for the duration of one read-modify-write cycle.
///
/// The lock is released when the guard is dropped, on every exit path.
pub type ResourceGuard = OwnedMutexGuard<()>;

/// Registry mapping canonical resource paths to their lock handles.
///
/// Entries live for the lifetime of the registry and are never evicted;
/// list cardinality is small in practice.
#[derive(Debug, Default)]
pub struct LockManager {
    handles: Mutex<HashMap<PathBuf, Arc<AsyncMutex<()>>>>,
}

impl LockManager {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `path`.
    pub async fn acquire(&self, path: &Path) -> ResourceGuard {
        let handle = self.handle(path);
        let guard = handle.lock_owned().await;
        tracing::trace!(path = %path.display(), "acquired resource lock");
        guard
    }

    /// Number of distinct resources that have been locked so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no resource has been locked yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn handle(&self, path: &Path) -> Arc<AsyncMutex<()>> {
        let mut handles = self
            .handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(handles.entry(path.to_path_buf()).or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_path_shares_handle() {
        let locks = LockManager::new();
        assert!(locks.is_empty());

        let a = Path::new("/lists/a.json");
        drop(locks.acquire(a).await);
        drop(locks.acquire(a).await);
        assert_eq!(locks.len(), 1);

        drop(locks.acquire(Path::new("/lists/b.json")).await);
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_different_paths_do_not_block() {
        let locks = LockManager::new();
        let _a = locks.acquire(Path::new("/lists/a.json")).await;

        let b = tokio::time::timeout(
            Duration::from_millis(100),
            locks.acquire(Path::new("/lists/b.json")),
        )
        .await;
        assert!(b.is_ok(), "lock on another list must not wait");
    }

    #[tokio::test]
    async fn test_same_path_waits_for_release() {
        let locks = Arc::new(LockManager::new());
        let path = PathBuf::from("/lists/a.json");
        let guard = locks.acquire(&path).await;

        let contender = {
            let locks = Arc::clone(&locks);
            let path = path.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(&path).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!contender.is_finished(), "waiter must queue while held");

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .expect("waiter acquires after release")
            .expect("waiter task completes");
    }
}
