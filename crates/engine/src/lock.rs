//! Keyed critical sections
//!
//! Responsibilities:
//! - One awaitable mutex per list (and per user for list reordering)
//! - Lazy entry creation, explicit pruning of idle entries
//!
//! Guards are plain RAII values; dropping one releases the section.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;
use uuid::Uuid;

/// Table of per-key mutexes serializing order mutations.
///
/// Keys are the raw uuids behind [`roster_core::ListId`] and
/// [`roster_core::UserId`]; both id spaces share the table.
#[derive(Debug, Default)]
pub struct ListLocks {
    entries: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl ListLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters the critical section for `key`, creating the entry on first
    /// use. The returned guard keeps the section held until dropped.
    ///
    /// Not reentrant: acquiring a key twice from the same task deadlocks.
    pub async fn acquire(&self, key: Uuid) -> OwnedMutexGuard<()> {
        let entry = {
            let mut entries = self.entries.lock().await;
            Arc::clone(
                entries
                    .entry(key)
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        entry.lock_owned().await
    }

    /// Drops entries nobody currently holds, returning how many went away.
    pub async fn prune(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        // A held guard keeps a second strong reference alive.
        entries.retain(|_, entry| Arc::strong_count(entry) > 1);
        let removed = before - entries.len();
        if removed > 0 {
            debug!("pruned {} idle lock entries", removed);
        }
        removed
    }

    /// Number of tracked entries, held or idle.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
