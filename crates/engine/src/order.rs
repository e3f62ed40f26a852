//! Sort-order assignment and relocation
//!
//! Responsibilities:
//! - Hand out the next free order when a document is appended
//! - Relocate a document by shifting only the window between its old and
//!   new position, leaving gaps elsewhere untouched
//!
//! Orders are unique within their scope (todos per list, lists per user)
//! but never contiguous by contract: deletions leave holes and the shift
//! never renumbers outside the affected window.

use chrono::Utc;
use roster_core::{List, ListId, Todo, TodoId, UserId};
use roster_storage::SharedStore;
use std::sync::Arc;
use tracing::debug;

use crate::error::EngineError;
use crate::lock::ListLocks;

/// Allocates and relocates sort orders for todos and lists.
pub struct OrderRegistry {
    store: SharedStore,
    locks: Arc<ListLocks>,
}

impl OrderRegistry {
    pub fn new(store: SharedStore, locks: Arc<ListLocks>) -> Self {
        Self { store, locks }
    }

    /// Next free order in a list: one past the current maximum, or 0 for
    /// an empty list. Always computed from a fresh read.
    pub async fn next_order(&self, list_id: ListId) -> Result<u32, EngineError> {
        let todos = self.store.todos_for_list(list_id).await?;
        Ok(todos
            .iter()
            .map(|t| t.sort_order.saturating_add(1))
            .max()
            .unwrap_or(0))
    }

    /// Next free order among a user's lists.
    pub async fn next_list_order(&self, user_id: UserId) -> Result<u32, EngineError> {
        let lists = self.store.lists_for_user(user_id).await?;
        Ok(lists
            .iter()
            .map(|l| l.sort_order.saturating_add(1))
            .max()
            .unwrap_or(0))
    }

    /// Moves a todo to `new_order` inside its list, shifting every todo
    /// between the old and new position by one.
    ///
    /// Takes the list's critical section itself; callers must not hold it.
    pub async fn move_todo(&self, todo_id: TodoId, new_order: u32) -> Result<Todo, EngineError> {
        let Some(existing) = self.store.get_todo(todo_id).await? else {
            return Err(EngineError::not_found("todo"));
        };
        let list_id = existing.list_id;

        let _guard = self.locks.acquire(list_id.0).await;
        // Re-read now that the section is held; the order may have moved.
        let Some(mut todo) = self.store.get_todo(todo_id).await? else {
            return Err(EngineError::not_found("todo"));
        };
        let old_order = todo.sort_order;
        if old_order == new_order {
            debug!("todo {} already at order {}", todo_id, new_order);
            return Ok(todo);
        }

        let now = Utc::now();
        for mut neighbor in self.store.todos_for_list(list_id).await? {
            if neighbor.id == todo_id {
                continue;
            }
            if let Some(shifted) = shifted_order(neighbor.sort_order, old_order, new_order) {
                neighbor.sort_order = shifted;
                neighbor.updated_at = now;
                self.store.put_todo(&neighbor).await?;
            }
        }

        todo.sort_order = new_order;
        todo.updated_at = now;
        self.store.put_todo(&todo).await?;
        debug!(
            "moved todo {} from order {} to {} in list {}",
            todo_id, old_order, new_order, list_id
        );
        Ok(todo)
    }

    /// Moves a list to `new_order` among its owner's lists, with the same
    /// window shift as [`OrderRegistry::move_todo`].
    pub async fn move_list(&self, list_id: ListId, new_order: u32) -> Result<List, EngineError> {
        let Some(existing) = self.store.get_list(list_id).await? else {
            return Err(EngineError::not_found("list"));
        };
        let user_id = existing.user_id;

        let _guard = self.locks.acquire(user_id.0).await;
        let Some(mut list) = self.store.get_list(list_id).await? else {
            return Err(EngineError::not_found("list"));
        };
        let old_order = list.sort_order;
        if old_order == new_order {
            return Ok(list);
        }

        let now = Utc::now();
        for mut neighbor in self.store.lists_for_user(user_id).await? {
            if neighbor.id == list_id {
                continue;
            }
            if let Some(shifted) = shifted_order(neighbor.sort_order, old_order, new_order) {
                neighbor.sort_order = shifted;
                neighbor.updated_at = now;
                self.store.put_list(&neighbor).await?;
            }
        }

        list.sort_order = new_order;
        list.updated_at = now;
        self.store.put_list(&list).await?;
        debug!(
            "moved list {} from order {} to {} for user {}",
            list_id, old_order, new_order, user_id
        );
        Ok(list)
    }
}

/// New order for a neighbor when some document moves from `old` to `new`.
/// `None` means the neighbor sits outside the shifted window.
fn shifted_order(neighbor: u32, old: u32, new: u32) -> Option<u32> {
    if new > old && neighbor > old && neighbor <= new {
        Some(neighbor - 1)
    } else if new < old && neighbor >= new && neighbor < old {
        Some(neighbor + 1)
    } else {
        None
    }
}
