//! Denormalized list counters
//!
//! `todo_count` and `completed_todo_count` on a list are read-path copies
//! of state that lives in the todos. They are always recomputed from a
//! full scan of the list's todos and written in one update; nothing ever
//! increments them in place.

use roster_core::ListId;
use roster_storage::SharedStore;
use tracing::{debug, warn};

/// Recomputes list counters after todo mutations.
pub struct CounterMaintainer {
    store: SharedStore,
}

impl CounterMaintainer {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Recomputes both counters for `list_id` and persists them.
    ///
    /// Failures are logged and swallowed: a list deleted mid-operation is
    /// a no-op, and a write failure leaves a stale counter that the next
    /// mutation corrects.
    pub async fn recompute(&self, list_id: ListId) {
        let todos = match self.store.todos_for_list(list_id).await {
            Ok(todos) => todos,
            Err(e) => {
                warn!("counter recompute for list {} failed to read: {}", list_id, e);
                return;
            }
        };
        let todo_count = todos.len() as u64;
        let completed = todos.iter().filter(|t| t.completed).count() as u64;

        match self
            .store
            .update_list_counters(list_id, todo_count, completed)
            .await
        {
            Ok(true) => debug!(
                "recomputed counters for list {}: {}/{} completed",
                list_id, completed, todo_count
            ),
            Ok(false) => debug!("list {} is gone, skipping counter write", list_id),
            Err(e) => warn!("counter write for list {} failed: {}", list_id, e),
        }
    }
}
