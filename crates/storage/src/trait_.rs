//! Store trait definition
//!
//! Abstract interface over the list and todo document collections.

use async_trait::async_trait;
use roster_core::{List, ListId, Todo, TodoFilter, TodoId, TodoSort, UserId};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

/// Backend failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Raised by [`Store::insert_todo`] when the sort order is already
    /// taken inside the target list.
    #[error("sort order {order} already taken in list {list_id}")]
    DuplicateSortOrder { list_id: ListId, order: u32 },

    #[error("lock failed: {0}")]
    LockFailed(String),
}

/// Document store for lists and todos.
///
/// Writes are whole-document; the only constraint a backend enforces is
/// sort-order uniqueness at insert time. Cross-document consistency is the
/// caller's business.
#[async_trait]
pub trait Store: Send + Sync {
    // ============ List operations ============

    async fn insert_list(&self, list: &List) -> Result<(), StoreError>;
    async fn get_list(&self, id: ListId) -> Result<Option<List>, StoreError>;
    /// Writes the full document, replacing any previous version.
    async fn put_list(&self, list: &List) -> Result<(), StoreError>;
    /// Returns whether a document was actually removed.
    async fn delete_list(&self, id: ListId) -> Result<bool, StoreError>;
    async fn lists_for_user(&self, user_id: UserId) -> Result<Vec<List>, StoreError>;
    /// Case-insensitive name lookup among one user's lists.
    async fn find_list_by_name(
        &self,
        user_id: UserId,
        name: &str,
    ) -> Result<Option<List>, StoreError>;
    /// Writes both counters and refreshes `updated_at` in one update.
    /// Returns `false` without writing when the list no longer exists; a
    /// counter write must never resurrect a deleted list.
    async fn update_list_counters(
        &self,
        id: ListId,
        todo_count: u64,
        completed_todo_count: u64,
    ) -> Result<bool, StoreError>;

    // ============ Todo operations ============

    /// Inserts a fresh document, rejecting a sort order already present in
    /// the target list with [`StoreError::DuplicateSortOrder`].
    async fn insert_todo(&self, todo: &Todo) -> Result<(), StoreError>;
    async fn get_todo(&self, id: TodoId) -> Result<Option<Todo>, StoreError>;
    /// Writes the full document, replacing any previous version.
    async fn put_todo(&self, todo: &Todo) -> Result<(), StoreError>;
    /// Returns whether a document was actually removed.
    async fn delete_todo(&self, id: TodoId) -> Result<bool, StoreError>;
    async fn todos_for_list(&self, list_id: ListId) -> Result<Vec<Todo>, StoreError>;
    async fn todos_for_user(&self, user_id: UserId) -> Result<Vec<Todo>, StoreError>;
    /// Removes every todo in the list, returning how many went away.
    async fn delete_todos_for_list(&self, list_id: ListId) -> Result<u64, StoreError>;
    async fn count_todos(&self, filter: &TodoFilter) -> Result<u64, StoreError>;
    /// Filtered, sorted window of todos. `offset` and `limit` are applied
    /// after sorting with the comparator from [`TodoSort`].
    async fn query_todos(
        &self,
        filter: &TodoFilter,
        sort: &TodoSort,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Todo>, StoreError>;
}

/// Shared store reference
pub type SharedStore = Arc<dyn Store>;

pub(crate) fn read_guard<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, StoreError> {
    lock.read().map_err(|e| StoreError::LockFailed(e.to_string()))
}

pub(crate) fn write_guard<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, StoreError> {
    lock.write().map_err(|e| StoreError::LockFailed(e.to_string()))
}
