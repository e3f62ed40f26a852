//! Service facade
//!
//! Single entry point for every mutation and query on lists and todos.
//! The service wires together ordering, counter maintenance, statistics
//! and query building on top of one shared store, and owns the
//! visibility rules:
//! - a missing document, or a private one owned by someone else, reads
//!   as not found
//! - a public list owned by someone else can be read but not written;
//!   writes fail as forbidden

use chrono::Utc;
use roster_core::{
    DEFAULT_COLOR, EngineConfig, List, ListId, ListPatch, NewList, NewTodo, Todo, TodoId,
    TodoPatch, UserId,
};
use roster_storage::{SharedStore, StoreError};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::counter::CounterMaintainer;
use crate::error::EngineError;
use crate::lock::ListLocks;
use crate::order::OrderRegistry;
use crate::query::{Pagination, QueryFilterBuilder, TodoPage, TodoQueryParams};
use crate::stats::{ListStats, StatisticsAggregator, UserStats};

/// Trimmed acknowledgement returned by todo reordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReorderReceipt {
    pub id: TodoId,
    pub title: String,
    pub order: u32,
}

/// Ordering and aggregate engine for one store.
pub struct TodoOrderingService {
    store: SharedStore,
    locks: Arc<ListLocks>,
    orders: OrderRegistry,
    counters: CounterMaintainer,
    stats: StatisticsAggregator,
    queries: QueryFilterBuilder,
    insert_retries: u32,
}

impl TodoOrderingService {
    pub fn new(store: SharedStore) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: SharedStore, config: EngineConfig) -> Self {
        let locks = Arc::new(ListLocks::new());
        Self {
            orders: OrderRegistry::new(store.clone(), Arc::clone(&locks)),
            counters: CounterMaintainer::new(store.clone()),
            stats: StatisticsAggregator::new(store.clone()),
            queries: QueryFilterBuilder::from_config(&config),
            insert_retries: config.insert_retries,
            locks,
            store,
        }
    }

    // ============ Todo operations ============

    /// Creates a todo appended at the end of the list.
    ///
    /// The sort order is allocated and the document inserted inside the
    /// list's critical section; on a duplicate-order clash the allocation
    /// is retried a bounded number of times before giving up with a
    /// conflict.
    pub async fn create_todo(
        &self,
        list_id: ListId,
        user_id: UserId,
        new: NewTodo,
    ) -> Result<Todo, EngineError> {
        self.writable_list(list_id, user_id).await?;
        let fields = new.validated()?;

        let _guard = self.locks.acquire(list_id.0).await;
        // The list may have been deleted between the check and the lock.
        if self.store.get_list(list_id).await?.is_none() {
            return Err(EngineError::not_found("list"));
        }

        let now = Utc::now();
        let mut todo = Todo {
            id: TodoId::new(),
            list_id,
            user_id,
            title: fields.title,
            description: fields.description.unwrap_or_default(),
            priority: fields.priority.unwrap_or_default(),
            due_date: fields.due_date,
            tags: fields.tags.unwrap_or_default(),
            completed: false,
            completed_at: None,
            sort_order: 0,
            estimated_minutes: fields.estimated_minutes,
            actual_minutes: None,
            created_at: now,
            updated_at: now,
        };

        let mut attempts = 0;
        loop {
            attempts += 1;
            todo.sort_order = self.orders.next_order(list_id).await?;
            match self.store.insert_todo(&todo).await {
                Ok(()) => break,
                Err(StoreError::DuplicateSortOrder { order, .. })
                    if attempts < self.insert_retries =>
                {
                    debug!(
                        "sort order {} taken in list {}, retrying ({}/{})",
                        order, list_id, attempts, self.insert_retries
                    );
                }
                Err(StoreError::DuplicateSortOrder { .. }) => {
                    return Err(EngineError::Conflict(format!(
                        "could not allocate a unique sort order in list {list_id}"
                    )));
                }
                Err(e) => return Err(e.into()),
            }
        }
        drop(_guard);

        self.counters.recompute(list_id).await;
        info!("Created todo {} in list {}", todo.id, list_id);
        Ok(todo)
    }

    pub async fn get_todo(&self, todo_id: TodoId, user_id: UserId) -> Result<Todo, EngineError> {
        self.readable_todo(todo_id, user_id).await
    }

    /// Applies a partial update. The patch lands on a fresh read taken
    /// inside the list's critical section. Counters are recomputed only
    /// when the completion state actually changed.
    pub async fn update_todo(
        &self,
        todo_id: TodoId,
        user_id: UserId,
        patch: TodoPatch,
    ) -> Result<Todo, EngineError> {
        let existing = self.writable_todo(todo_id, user_id).await?;
        if patch.is_empty() {
            return Ok(existing);
        }
        let patch = patch.validated()?;

        let _guard = self.locks.acquire(existing.list_id.0).await;
        // Re-read now that the section is held; a reorder may have shifted
        // this todo since the ownership check.
        let Some(mut todo) = self.store.get_todo(todo_id).await? else {
            return Err(EngineError::not_found("todo"));
        };
        let completion_changed = patch.completed.is_some_and(|c| c != todo.completed);
        todo.apply_patch(patch, Utc::now());
        self.store.put_todo(&todo).await?;
        drop(_guard);

        if completion_changed {
            self.counters.recompute(todo.list_id).await;
        }
        debug!("Updated todo {}", todo_id);
        Ok(todo)
    }

    /// Sets the completion flag, maintaining `completed_at`.
    pub async fn set_completed(
        &self,
        todo_id: TodoId,
        user_id: UserId,
        completed: bool,
    ) -> Result<Todo, EngineError> {
        let patch = TodoPatch {
            completed: Some(completed),
            ..TodoPatch::default()
        };
        self.update_todo(todo_id, user_id, patch).await
    }

    /// Deletes one todo inside the list's critical section. Remaining
    /// orders in the list keep their values; the hole is left in place.
    pub async fn delete_todo(&self, todo_id: TodoId, user_id: UserId) -> Result<(), EngineError> {
        let todo = self.writable_todo(todo_id, user_id).await?;

        let _guard = self.locks.acquire(todo.list_id.0).await;
        // The todo may have gone between the check and the lock.
        if !self.store.delete_todo(todo_id).await? {
            return Err(EngineError::not_found("todo"));
        }
        drop(_guard);

        self.counters.recompute(todo.list_id).await;
        info!("Deleted todo {} from list {}", todo_id, todo.list_id);
        Ok(())
    }

    /// Moves a todo to a new position in its list.
    pub async fn reorder_todo(
        &self,
        todo_id: TodoId,
        user_id: UserId,
        new_order: i64,
    ) -> Result<ReorderReceipt, EngineError> {
        self.writable_todo(todo_id, user_id).await?;
        let target = u32::try_from(new_order).map_err(|_| EngineError::OutOfRange(new_order))?;
        let moved = self.orders.move_todo(todo_id, target).await?;
        Ok(ReorderReceipt {
            id: moved.id,
            title: moved.title,
            order: moved.sort_order,
        })
    }

    /// Filtered, sorted, paginated todos for one user. A `list_id` in the
    /// parameters must name a list the user owns.
    pub async fn list_todos(
        &self,
        user_id: UserId,
        params: &TodoQueryParams,
    ) -> Result<TodoPage, EngineError> {
        if let Some(list_id) = params.list_id {
            self.owned_list(list_id, user_id).await?;
        }
        let query = self.queries.build(user_id, params)?;
        let total = self.store.count_todos(&query.filter).await?;
        let todos = self
            .store
            .query_todos(&query.filter, &query.sort, query.offset(), query.limit as u64)
            .await?;
        Ok(TodoPage {
            todos,
            pagination: Pagination::new(query.page, query.limit, total),
        })
    }

    // ============ List operations ============

    pub async fn create_list(&self, user_id: UserId, new: NewList) -> Result<List, EngineError> {
        let fields = new.validated()?;

        // Name uniqueness and order allocation race with other creates
        // for the same user.
        let _guard = self.locks.acquire(user_id.0).await;
        if self
            .store
            .find_list_by_name(user_id, &fields.name)
            .await?
            .is_some()
        {
            return Err(EngineError::Conflict(format!(
                "list name '{}' already in use",
                fields.name
            )));
        }

        let now = Utc::now();
        let list = List {
            id: ListId::new(),
            user_id,
            name: fields.name,
            description: fields.description.unwrap_or_default(),
            color: fields.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            is_public: fields.is_public.unwrap_or(false),
            todo_count: 0,
            completed_todo_count: 0,
            sort_order: self.orders.next_list_order(user_id).await?,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_list(&list).await?;

        info!("Created list {} for user {}", list.id, user_id);
        Ok(list)
    }

    pub async fn get_list(&self, list_id: ListId, user_id: UserId) -> Result<List, EngineError> {
        self.readable_list(list_id, user_id).await
    }

    /// Lists owned by the user, ordered by position.
    pub async fn lists_for_user(&self, user_id: UserId) -> Result<Vec<List>, EngineError> {
        let mut lists = self.store.lists_for_user(user_id).await?;
        lists.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.id.cmp(&b.id)));
        Ok(lists)
    }

    /// Applies a partial update to a list. The patch lands on a fresh
    /// read taken inside the user's critical section, the same section
    /// list reordering runs under.
    pub async fn update_list(
        &self,
        list_id: ListId,
        user_id: UserId,
        patch: ListPatch,
    ) -> Result<List, EngineError> {
        self.writable_list(list_id, user_id).await?;
        let patch = patch.validated()?;

        let _guard = self.locks.acquire(user_id.0).await;
        let Some(mut list) = self.store.get_list(list_id).await? else {
            return Err(EngineError::not_found("list"));
        };
        // A rename to a genuinely different name re-checks uniqueness
        // under the same section.
        if let Some(name) = &patch.name {
            if name.to_lowercase() != list.name.to_lowercase()
                && self.store.find_list_by_name(user_id, name).await?.is_some()
            {
                return Err(EngineError::Conflict(format!(
                    "list name '{name}' already in use"
                )));
            }
        }

        list.apply_patch(patch, Utc::now());
        self.store.put_list(&list).await?;
        debug!("Updated list {}", list_id);
        Ok(list)
    }

    /// Deletes a list and every todo in it, returning how many todos were
    /// removed with it.
    ///
    /// Holds the user's section (serializing with list reordering and
    /// renames) and the list's section (serializing with todo mutations),
    /// always in that order.
    pub async fn delete_list(&self, list_id: ListId, user_id: UserId) -> Result<u64, EngineError> {
        self.writable_list(list_id, user_id).await?;

        let removed = {
            let _user_guard = self.locks.acquire(user_id.0).await;
            let _list_guard = self.locks.acquire(list_id.0).await;
            let removed = self.store.delete_todos_for_list(list_id).await?;
            // The list may have gone between the check and the locks.
            if !self.store.delete_list(list_id).await? {
                return Err(EngineError::not_found("list"));
            }
            removed
        };
        self.locks.prune().await;

        info!("Deleted list {} and {} todos", list_id, removed);
        Ok(removed)
    }

    /// Copies a list and its todos under a new name. Copied todos keep
    /// their order and content but start uncompleted and with no logged
    /// time. Returns the new list and the number of todos copied.
    ///
    /// A copy that fails partway leaves the new list behind with the
    /// todos inserted so far; its counters are recomputed before the
    /// error surfaces.
    pub async fn duplicate_list(
        &self,
        list_id: ListId,
        user_id: UserId,
        name: Option<String>,
    ) -> Result<(List, u64), EngineError> {
        let source = self.owned_list(list_id, user_id).await?;
        let requested = name.unwrap_or_else(|| format!("{} (copy)", source.name));
        let fields = NewList::new(requested).validated()?;

        let copy = {
            let _guard = self.locks.acquire(user_id.0).await;
            if self
                .store
                .find_list_by_name(user_id, &fields.name)
                .await?
                .is_some()
            {
                return Err(EngineError::Conflict(format!(
                    "list name '{}' already in use",
                    fields.name
                )));
            }

            let now = Utc::now();
            let copy = List {
                id: ListId::new(),
                user_id,
                name: fields.name,
                description: source.description.clone(),
                color: source.color.clone(),
                is_public: false,
                todo_count: 0,
                completed_todo_count: 0,
                sort_order: self.orders.next_list_order(user_id).await?,
                created_at: now,
                updated_at: now,
            };
            self.store.insert_list(&copy).await?;
            copy
        };

        let mut todos = self.store.todos_for_list(source.id).await?;
        todos.sort_by_key(|t| t.sort_order);
        let now = Utc::now();
        let mut copied = 0u64;
        for t in &todos {
            let dup = Todo {
                id: TodoId::new(),
                list_id: copy.id,
                user_id,
                title: t.title.clone(),
                description: t.description.clone(),
                priority: t.priority,
                due_date: t.due_date,
                tags: t.tags.clone(),
                completed: false,
                completed_at: None,
                sort_order: t.sort_order,
                estimated_minutes: t.estimated_minutes,
                actual_minutes: None,
                created_at: now,
                updated_at: now,
            };
            if let Err(e) = self.store.insert_todo(&dup).await {
                self.counters.recompute(copy.id).await;
                return Err(e.into());
            }
            copied += 1;
        }

        self.counters.recompute(copy.id).await;
        let list = self
            .store
            .get_list(copy.id)
            .await?
            .ok_or(EngineError::not_found("list"))?;
        info!(
            "Duplicated list {} into {} with {} todos",
            source.id, list.id, copied
        );
        Ok((list, copied))
    }

    /// Moves a list to a new position among the user's lists.
    pub async fn reorder_list(
        &self,
        list_id: ListId,
        user_id: UserId,
        new_order: i64,
    ) -> Result<List, EngineError> {
        self.writable_list(list_id, user_id).await?;
        let target = u32::try_from(new_order).map_err(|_| EngineError::OutOfRange(new_order))?;
        self.orders.move_list(list_id, target).await
    }

    // ============ Statistics ============

    /// Stats for one of the user's own lists.
    pub async fn list_stats(
        &self,
        list_id: ListId,
        user_id: UserId,
    ) -> Result<ListStats, EngineError> {
        self.owned_list(list_id, user_id).await?;
        self.stats.list_stats(list_id).await
    }

    /// Stats across every todo the user owns.
    pub async fn user_stats(&self, user_id: UserId) -> Result<UserStats, EngineError> {
        self.stats.user_stats(user_id).await
    }

    // ============ Visibility ============

    /// Owner only; everything else reads as not found.
    async fn owned_list(&self, list_id: ListId, user_id: UserId) -> Result<List, EngineError> {
        match self.store.get_list(list_id).await? {
            Some(list) if list.user_id == user_id => Ok(list),
            _ => Err(EngineError::not_found("list")),
        }
    }

    /// Owner or public list; private lists of others read as not found.
    async fn readable_list(&self, list_id: ListId, user_id: UserId) -> Result<List, EngineError> {
        match self.store.get_list(list_id).await? {
            Some(list) if list.user_id == user_id || list.is_public => Ok(list),
            _ => Err(EngineError::not_found("list")),
        }
    }

    /// Owner may write; a public list of another user is forbidden, a
    /// private one reads as not found.
    async fn writable_list(&self, list_id: ListId, user_id: UserId) -> Result<List, EngineError> {
        let Some(list) = self.store.get_list(list_id).await? else {
            return Err(EngineError::not_found("list"));
        };
        if list.user_id == user_id {
            Ok(list)
        } else if list.is_public {
            Err(EngineError::Forbidden(
                "list belongs to another user".to_string(),
            ))
        } else {
            Err(EngineError::not_found("list"))
        }
    }

    async fn readable_todo(&self, todo_id: TodoId, user_id: UserId) -> Result<Todo, EngineError> {
        let Some(todo) = self.store.get_todo(todo_id).await? else {
            return Err(EngineError::not_found("todo"));
        };
        if todo.user_id == user_id {
            return Ok(todo);
        }
        match self.store.get_list(todo.list_id).await? {
            Some(list) if list.is_public => Ok(todo),
            _ => Err(EngineError::not_found("todo")),
        }
    }

    async fn writable_todo(&self, todo_id: TodoId, user_id: UserId) -> Result<Todo, EngineError> {
        let Some(todo) = self.store.get_todo(todo_id).await? else {
            return Err(EngineError::not_found("todo"));
        };
        if todo.user_id == user_id {
            return Ok(todo);
        }
        match self.store.get_list(todo.list_id).await? {
            Some(list) if list.is_public => Err(EngineError::Forbidden(
                "todo belongs to another user".to_string(),
            )),
            _ => Err(EngineError::not_found("todo")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;
    use roster_core::{Priority, SortDirection, SortField, TodoFilter, TodoSort};
    use roster_storage::{create_memory_store, JsonStore, MemoryStore, Store};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use tokio::sync::Semaphore;

    fn service() -> TodoOrderingService {
        TodoOrderingService::new(create_memory_store())
    }

    async fn seed_list(service: &TodoOrderingService, user: UserId, name: &str) -> List {
        service.create_list(user, NewList::new(name)).await.unwrap()
    }

    #[tokio::test]
    async fn test_lifecycle_keeps_counters_and_orders_consistent() {
        let service = service();
        let user = UserId::new();
        let list = seed_list(&service, user, "work").await;

        let mut ids = vec![];
        for title in ["a", "b", "c"] {
            let todo = service
                .create_todo(list.id, user, NewTodo::new(title))
                .await
                .unwrap();
            ids.push(todo.id);
        }
        let orders: Vec<u32> = {
            let mut page = service
                .list_todos(
                    user,
                    &TodoQueryParams {
                        sort_by: Some(SortField::SortOrder),
                        direction: Some(SortDirection::Asc),
                        ..TodoQueryParams::default()
                    },
                )
                .await
                .unwrap();
            page.todos.drain(..).map(|t| t.sort_order).collect()
        };
        assert_eq!(orders, vec![0, 1, 2]);

        let stored = service.get_list(list.id, user).await.unwrap();
        assert_eq!(stored.todo_count, 3);
        assert_eq!(stored.completed_todo_count, 0);

        service.set_completed(ids[1], user, true).await.unwrap();
        let stored = service.get_list(list.id, user).await.unwrap();
        assert_eq!(stored.completed_todo_count, 1);

        // Deleting the completed middle todo leaves a gap, not a renumber.
        service.delete_todo(ids[1], user).await.unwrap();
        let stored = service.get_list(list.id, user).await.unwrap();
        assert_eq!(stored.todo_count, 2);
        assert_eq!(stored.completed_todo_count, 0);

        let page = service
            .list_todos(
                user,
                &TodoQueryParams {
                    sort_by: Some(SortField::SortOrder),
                    direction: Some(SortDirection::Asc),
                    ..TodoQueryParams::default()
                },
            )
            .await
            .unwrap();
        let orders: Vec<u32> = page.todos.iter().map(|t| t.sort_order).collect();
        assert_eq!(orders, vec![0, 2]);

        // The next create appends past the gap.
        let appended = service
            .create_todo(list.id, user, NewTodo::new("d"))
            .await
            .unwrap();
        assert_eq!(appended.sort_order, 3);
    }

    #[tokio::test]
    async fn test_reorder_returns_receipt() {
        let service = service();
        let user = UserId::new();
        let list = seed_list(&service, user, "work").await;
        let mut ids = vec![];
        for title in ["A", "B", "C", "D", "E"] {
            ids.push(
                service
                    .create_todo(list.id, user, NewTodo::new(title))
                    .await
                    .unwrap()
                    .id,
            );
        }

        let receipt = service.reorder_todo(ids[1], user, 3).await.unwrap();
        assert_eq!(
            receipt,
            ReorderReceipt {
                id: ids[1],
                title: "B".to_string(),
                order: 3,
            }
        );
    }

    #[tokio::test]
    async fn test_reorder_rejects_negative_orders() {
        let service = service();
        let user = UserId::new();
        let list = seed_list(&service, user, "work").await;
        let todo = service
            .create_todo(list.id, user, NewTodo::new("a"))
            .await
            .unwrap();

        let err = service.reorder_todo(todo.id, user, -3).await.unwrap_err();
        assert!(matches!(err, EngineError::OutOfRange(-3)));
        // Nothing moved.
        let unchanged = service.get_todo(todo.id, user).await.unwrap();
        assert_eq!(unchanged.sort_order, 0);
    }

    #[tokio::test]
    async fn test_cascade_delete_reports_count() {
        let service = service();
        let user = UserId::new();
        let list = seed_list(&service, user, "work").await;
        for title in ["a", "b", "c"] {
            service
                .create_todo(list.id, user, NewTodo::new(title))
                .await
                .unwrap();
        }

        let removed = service.delete_list(list.id, user).await.unwrap();
        assert_eq!(removed, 3);

        let err = service.list_stats(list.id, user).await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound { resource: "list" }));

        // The user has no todos left anywhere.
        let page = service
            .list_todos(user, &TodoQueryParams::default())
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 0);
    }

    #[tokio::test]
    async fn test_duplicate_list_resets_completion_and_keeps_orders() {
        let service = service();
        let user = UserId::new();
        let list = seed_list(&service, user, "project").await;
        let mut ids = vec![];
        for title in ["a", "b", "c", "d", "e"] {
            ids.push(
                service
                    .create_todo(list.id, user, NewTodo::new(title))
                    .await
                    .unwrap()
                    .id,
            );
        }
        service.set_completed(ids[0], user, true).await.unwrap();
        service.set_completed(ids[3], user, true).await.unwrap();

        let (copy, copied) = service.duplicate_list(list.id, user, None).await.unwrap();
        assert_eq!(copied, 5);
        assert_eq!(copy.name, "project (copy)");
        assert_eq!(copy.todo_count, 5);
        assert_eq!(copy.completed_todo_count, 0);

        let page = service
            .list_todos(
                user,
                &TodoQueryParams {
                    list_id: Some(copy.id),
                    sort_by: Some(SortField::SortOrder),
                    direction: Some(SortDirection::Asc),
                    ..TodoQueryParams::default()
                },
            )
            .await
            .unwrap();
        let titles: Vec<&str> = page.todos.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c", "d", "e"]);
        assert!(page.todos.iter().all(|t| !t.completed && t.completed_at.is_none()));

        // The source list is untouched.
        let source = service.get_list(list.id, user).await.unwrap();
        assert_eq!(source.completed_todo_count, 2);

        // Duplicating again under the same default name clashes.
        let err = service
            .duplicate_list(list.id, user, None)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_pagination_is_stable_across_pages() {
        let service = service();
        let user = UserId::new();
        let list = seed_list(&service, user, "bulk").await;
        for i in 0..25 {
            service
                .create_todo(list.id, user, NewTodo::new(format!("todo {i}")))
                .await
                .unwrap();
        }

        let mut seen = HashSet::new();
        let mut sizes = vec![];
        for page_no in 1..=3 {
            let page = service
                .list_todos(
                    user,
                    &TodoQueryParams {
                        page: Some(page_no),
                        limit: Some(10),
                        ..TodoQueryParams::default()
                    },
                )
                .await
                .unwrap();
            assert_eq!(page.pagination.current, page_no);
            assert_eq!(page.pagination.total, 25);
            assert_eq!(page.pagination.pages, 3);
            sizes.push(page.todos.len());
            for todo in page.todos {
                assert!(seen.insert(todo.id), "todo appeared on two pages");
            }
        }
        assert_eq!(sizes, vec![10, 10, 5]);
        assert_eq!(seen.len(), 25);
    }

    #[tokio::test]
    async fn test_user_stats_cover_overdue_and_estimates() {
        let service = service();
        let user = UserId::new();
        let list = seed_list(&service, user, "stats").await;
        let now = Utc::now();

        let mut overdue = NewTodo::new("late");
        overdue.due_date = Some(now - Duration::days(1));
        overdue.estimated_minutes = Some(30);
        service.create_todo(list.id, user, overdue).await.unwrap();

        let mut due_later = NewTodo::new("future");
        due_later.due_date = Some(now + Duration::days(1));
        due_later.estimated_minutes = Some(60);
        service.create_todo(list.id, user, due_later).await.unwrap();

        let done = service
            .create_todo(list.id, user, NewTodo::new("finished"))
            .await
            .unwrap();
        service.set_completed(done.id, user, true).await.unwrap();

        let stats = service.user_stats(user).await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.completion_percentage, 33);
        assert_eq!(stats.total_estimated_minutes, 90);
        assert_eq!(stats.avg_estimated_minutes, 45);
        assert_eq!(stats.recently_completed, 1);

        let list_stats = service.list_stats(list.id, user).await.unwrap();
        assert_eq!(list_stats.total, 3);
        assert_eq!(list_stats.overdue, 1);
    }

    #[tokio::test]
    async fn test_completing_twice_keeps_first_timestamp() {
        let service = service();
        let user = UserId::new();
        let list = seed_list(&service, user, "work").await;
        let todo = service
            .create_todo(list.id, user, NewTodo::new("a"))
            .await
            .unwrap();

        let first = service.set_completed(todo.id, user, true).await.unwrap();
        let second = service.set_completed(todo.id, user, true).await.unwrap();
        assert_eq!(first.completed_at, second.completed_at);

        let reopened = service.set_completed(todo.id, user, false).await.unwrap();
        assert_eq!(reopened.completed_at, None);

        let stored = service.get_list(list.id, user).await.unwrap();
        assert_eq!(stored.completed_todo_count, 0);
    }

    #[tokio::test]
    async fn test_title_validation_and_trimming() {
        let service = service();
        let user = UserId::new();
        let list = seed_list(&service, user, "work").await;

        let err = service
            .create_todo(list.id, user, NewTodo::new("   "))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "validation");

        let todo = service
            .create_todo(list.id, user, NewTodo::new("  trimmed  "))
            .await
            .unwrap();
        assert_eq!(todo.title, "trimmed");
    }

    #[tokio::test]
    async fn test_private_lists_of_others_read_as_not_found() {
        let service = service();
        let owner = UserId::new();
        let stranger = UserId::new();
        let list = seed_list(&service, owner, "private").await;
        let todo = service
            .create_todo(list.id, owner, NewTodo::new("secret"))
            .await
            .unwrap();

        assert!(matches!(
            service.get_list(list.id, stranger).await.unwrap_err(),
            EngineError::NotFound { resource: "list" }
        ));
        assert!(matches!(
            service.get_todo(todo.id, stranger).await.unwrap_err(),
            EngineError::NotFound { resource: "todo" }
        ));
        assert!(matches!(
            service
                .create_todo(list.id, stranger, NewTodo::new("x"))
                .await
                .unwrap_err(),
            EngineError::NotFound { .. }
        ));
        assert!(matches!(
            service.delete_todo(todo.id, stranger).await.unwrap_err(),
            EngineError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_public_lists_are_readable_but_not_writable() {
        let service = service();
        let owner = UserId::new();
        let stranger = UserId::new();
        let mut new = NewList::new("shared");
        new.is_public = Some(true);
        let list = service.create_list(owner, new).await.unwrap();
        let todo = service
            .create_todo(list.id, owner, NewTodo::new("visible"))
            .await
            .unwrap();

        // Reads pass.
        assert_eq!(
            service.get_list(list.id, stranger).await.unwrap().id,
            list.id
        );
        assert_eq!(
            service.get_todo(todo.id, stranger).await.unwrap().id,
            todo.id
        );

        // Writes are forbidden.
        assert!(matches!(
            service
                .create_todo(list.id, stranger, NewTodo::new("x"))
                .await
                .unwrap_err(),
            EngineError::Forbidden(_)
        ));
        assert!(matches!(
            service
                .set_completed(todo.id, stranger, true)
                .await
                .unwrap_err(),
            EngineError::Forbidden(_)
        ));
        assert!(matches!(
            service.delete_list(list.id, stranger).await.unwrap_err(),
            EngineError::Forbidden(_)
        ));

        // Stats and scoped queries stay owner-only.
        assert!(matches!(
            service.list_stats(list.id, stranger).await.unwrap_err(),
            EngineError::NotFound { .. }
        ));
        let params = TodoQueryParams {
            list_id: Some(list.id),
            ..TodoQueryParams::default()
        };
        assert!(matches!(
            service.list_todos(stranger, &params).await.unwrap_err(),
            EngineError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_list_name_conflicts_ignore_case() {
        let service = service();
        let user = UserId::new();
        seed_list(&service, user, "Work").await;

        let err = service
            .create_list(user, NewList::new("work"))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));

        // Renaming a list to its own name with different casing is fine.
        let other = seed_list(&service, user, "Other").await;
        let patch = ListPatch {
            name: Some("OTHER".to_string()),
            ..ListPatch::default()
        };
        let renamed = service.update_list(other.id, user, patch).await.unwrap();
        assert_eq!(renamed.name, "OTHER");

        // Renaming onto an existing name clashes.
        let patch = ListPatch {
            name: Some("work".to_string()),
            ..ListPatch::default()
        };
        assert!(matches!(
            service.update_list(other.id, user, patch).await.unwrap_err(),
            EngineError::Conflict(_)
        ));
    }

    #[tokio::test]
    async fn test_lists_are_ordered_and_reorderable() {
        let service = service();
        let user = UserId::new();
        let a = seed_list(&service, user, "a").await;
        let b = seed_list(&service, user, "b").await;
        let c = seed_list(&service, user, "c").await;
        assert_eq!([a.sort_order, b.sort_order, c.sort_order], [0, 1, 2]);

        let moved = service.reorder_list(c.id, user, 0).await.unwrap();
        assert_eq!(moved.sort_order, 0);

        let names: Vec<String> = service
            .lists_for_user(user)
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_concurrent_creates_get_distinct_orders() {
        let service = Arc::new(service());
        let user = UserId::new();
        let list = seed_list(&service, user, "racing").await;

        let mut handles = vec![];
        for i in 0..8 {
            let service = Arc::clone(&service);
            let list_id = list.id;
            handles.push(tokio::spawn(async move {
                service
                    .create_todo(list_id, user, NewTodo::new(format!("t{i}")))
                    .await
                    .unwrap()
            }));
        }
        let mut orders = vec![];
        for handle in handles {
            orders.push(handle.await.unwrap().sort_order);
        }
        orders.sort_unstable();
        assert_eq!(orders, (0..8).collect::<Vec<u32>>());

        let stored = service.get_list(list.id, user).await.unwrap();
        assert_eq!(stored.todo_count, 8);
    }

    /// Store wrapper whose `insert_todo` lets the first `passes` calls
    /// through, fails the next `failures` with a duplicate-order clash,
    /// then delegates normally.
    struct FlakyStore {
        inner: MemoryStore,
        passes: AtomicU32,
        failures: AtomicU32,
    }

    impl FlakyStore {
        fn shared(failures: u32) -> SharedStore {
            Self::shared_after(0, failures)
        }

        fn shared_after(passes: u32, failures: u32) -> SharedStore {
            Arc::new(Self {
                inner: MemoryStore::new(),
                passes: AtomicU32::new(passes),
                failures: AtomicU32::new(failures),
            })
        }
    }

    #[async_trait]
    impl Store for FlakyStore {
        async fn insert_list(&self, list: &List) -> Result<(), StoreError> {
            self.inner.insert_list(list).await
        }
        async fn get_list(&self, id: ListId) -> Result<Option<List>, StoreError> {
            self.inner.get_list(id).await
        }
        async fn put_list(&self, list: &List) -> Result<(), StoreError> {
            self.inner.put_list(list).await
        }
        async fn delete_list(&self, id: ListId) -> Result<bool, StoreError> {
            self.inner.delete_list(id).await
        }
        async fn lists_for_user(&self, user_id: UserId) -> Result<Vec<List>, StoreError> {
            self.inner.lists_for_user(user_id).await
        }
        async fn find_list_by_name(
            &self,
            user_id: UserId,
            name: &str,
        ) -> Result<Option<List>, StoreError> {
            self.inner.find_list_by_name(user_id, name).await
        }
        async fn update_list_counters(
            &self,
            id: ListId,
            todo_count: u64,
            completed_todo_count: u64,
        ) -> Result<bool, StoreError> {
            self.inner
                .update_list_counters(id, todo_count, completed_todo_count)
                .await
        }
        async fn insert_todo(&self, todo: &Todo) -> Result<(), StoreError> {
            let passes = self.passes.load(Ordering::SeqCst);
            if passes > 0 {
                self.passes.store(passes - 1, Ordering::SeqCst);
                return self.inner.insert_todo(todo).await;
            }
            let left = self.failures.load(Ordering::SeqCst);
            if left > 0 {
                self.failures.store(left - 1, Ordering::SeqCst);
                return Err(StoreError::DuplicateSortOrder {
                    list_id: todo.list_id,
                    order: todo.sort_order,
                });
            }
            self.inner.insert_todo(todo).await
        }
        async fn get_todo(&self, id: TodoId) -> Result<Option<Todo>, StoreError> {
            self.inner.get_todo(id).await
        }
        async fn put_todo(&self, todo: &Todo) -> Result<(), StoreError> {
            self.inner.put_todo(todo).await
        }
        async fn delete_todo(&self, id: TodoId) -> Result<bool, StoreError> {
            self.inner.delete_todo(id).await
        }
        async fn todos_for_list(&self, list_id: ListId) -> Result<Vec<Todo>, StoreError> {
            self.inner.todos_for_list(list_id).await
        }
        async fn todos_for_user(&self, user_id: UserId) -> Result<Vec<Todo>, StoreError> {
            self.inner.todos_for_user(user_id).await
        }
        async fn delete_todos_for_list(&self, list_id: ListId) -> Result<u64, StoreError> {
            self.inner.delete_todos_for_list(list_id).await
        }
        async fn count_todos(&self, filter: &TodoFilter) -> Result<u64, StoreError> {
            self.inner.count_todos(filter).await
        }
        async fn query_todos(
            &self,
            filter: &TodoFilter,
            sort: &TodoSort,
            offset: u64,
            limit: u64,
        ) -> Result<Vec<Todo>, StoreError> {
            self.inner.query_todos(filter, sort, offset, limit).await
        }
    }

    #[tokio::test]
    async fn test_order_allocation_retries_then_succeeds() {
        let service = TodoOrderingService::new(FlakyStore::shared(2));
        let user = UserId::new();
        let list = seed_list(&service, user, "flaky").await;

        // Two clashes, success on the third and final attempt.
        let todo = service
            .create_todo(list.id, user, NewTodo::new("made it"))
            .await
            .unwrap();
        assert_eq!(todo.sort_order, 0);
    }

    #[tokio::test]
    async fn test_order_allocation_gives_up_with_conflict() {
        let service = TodoOrderingService::new(FlakyStore::shared(3));
        let user = UserId::new();
        let list = seed_list(&service, user, "flaky").await;

        let err = service
            .create_todo(list.id, user, NewTodo::new("never lands"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "conflict");

        // Nothing was inserted.
        let page = service
            .list_todos(user, &TodoQueryParams::default())
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 0);
    }

    #[tokio::test]
    async fn test_failed_duplicate_recounts_the_partial_copy() {
        // Two seed inserts and the first copied todo land; the second
        // copied todo fails.
        let service = TodoOrderingService::new(FlakyStore::shared_after(3, 1));
        let user = UserId::new();
        let list = seed_list(&service, user, "source").await;
        for title in ["a", "b"] {
            service
                .create_todo(list.id, user, NewTodo::new(title))
                .await
                .unwrap();
        }

        let err = service
            .duplicate_list(list.id, user, None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "storage");

        // The partial copy stays visible and its counters match what
        // actually landed.
        let lists = service.lists_for_user(user).await.unwrap();
        let copy = lists.iter().find(|l| l.name == "source (copy)").unwrap();
        assert_eq!(copy.todo_count, 1);
        assert_eq!(copy.completed_todo_count, 0);

        let page = service
            .list_todos(
                user,
                &TodoQueryParams {
                    list_id: Some(copy.id),
                    ..TodoQueryParams::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 1);
        assert_eq!(page.todos[0].title, "a");
    }

    /// Store wrapper that parks the first `put_todo` or `put_list`
    /// carrying a given title or name until the test opens the gate.
    /// Everything else delegates untouched.
    struct GatedStore {
        inner: MemoryStore,
        gated_name: &'static str,
        tripped: AtomicBool,
        arrived: Semaphore,
        gate: Semaphore,
    }

    impl GatedStore {
        fn new(gated_name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                inner: MemoryStore::new(),
                gated_name,
                tripped: AtomicBool::new(false),
                arrived: Semaphore::new(0),
                gate: Semaphore::new(0),
            })
        }

        /// Blocks until the gated write sits parked inside the store.
        async fn wait_until_parked(&self) {
            self.arrived.acquire().await.unwrap().forget();
        }

        fn open_gate(&self) {
            self.gate.add_permits(1);
        }
    }

    #[async_trait]
    impl Store for GatedStore {
        async fn insert_list(&self, list: &List) -> Result<(), StoreError> {
            self.inner.insert_list(list).await
        }
        async fn get_list(&self, id: ListId) -> Result<Option<List>, StoreError> {
            self.inner.get_list(id).await
        }
        async fn put_list(&self, list: &List) -> Result<(), StoreError> {
            if list.name == self.gated_name && !self.tripped.swap(true, Ordering::SeqCst) {
                self.arrived.add_permits(1);
                self.gate.acquire().await.unwrap().forget();
            }
            self.inner.put_list(list).await
        }
        async fn delete_list(&self, id: ListId) -> Result<bool, StoreError> {
            self.inner.delete_list(id).await
        }
        async fn lists_for_user(&self, user_id: UserId) -> Result<Vec<List>, StoreError> {
            self.inner.lists_for_user(user_id).await
        }
        async fn find_list_by_name(
            &self,
            user_id: UserId,
            name: &str,
        ) -> Result<Option<List>, StoreError> {
            self.inner.find_list_by_name(user_id, name).await
        }
        async fn update_list_counters(
            &self,
            id: ListId,
            todo_count: u64,
            completed_todo_count: u64,
        ) -> Result<bool, StoreError> {
            self.inner
                .update_list_counters(id, todo_count, completed_todo_count)
                .await
        }
        async fn insert_todo(&self, todo: &Todo) -> Result<(), StoreError> {
            self.inner.insert_todo(todo).await
        }
        async fn get_todo(&self, id: TodoId) -> Result<Option<Todo>, StoreError> {
            self.inner.get_todo(id).await
        }
        async fn put_todo(&self, todo: &Todo) -> Result<(), StoreError> {
            if todo.title == self.gated_name && !self.tripped.swap(true, Ordering::SeqCst) {
                self.arrived.add_permits(1);
                self.gate.acquire().await.unwrap().forget();
            }
            self.inner.put_todo(todo).await
        }
        async fn delete_todo(&self, id: TodoId) -> Result<bool, StoreError> {
            self.inner.delete_todo(id).await
        }
        async fn todos_for_list(&self, list_id: ListId) -> Result<Vec<Todo>, StoreError> {
            self.inner.todos_for_list(list_id).await
        }
        async fn todos_for_user(&self, user_id: UserId) -> Result<Vec<Todo>, StoreError> {
            self.inner.todos_for_user(user_id).await
        }
        async fn delete_todos_for_list(&self, list_id: ListId) -> Result<u64, StoreError> {
            self.inner.delete_todos_for_list(list_id).await
        }
        async fn count_todos(&self, filter: &TodoFilter) -> Result<u64, StoreError> {
            self.inner.count_todos(filter).await
        }
        async fn query_todos(
            &self,
            filter: &TodoFilter,
            sort: &TodoSort,
            offset: u64,
            limit: u64,
        ) -> Result<Vec<Todo>, StoreError> {
            self.inner.query_todos(filter, sort, offset, limit).await
        }
    }

    #[tokio::test]
    async fn test_update_racing_a_reorder_keeps_orders_unique() {
        let store = GatedStore::new("B renamed");
        let service = Arc::new(TodoOrderingService::new(store.clone()));
        let user = UserId::new();
        let list = seed_list(&service, user, "racing").await;
        let mut ids = vec![];
        for title in ["A", "B", "C"] {
            ids.push(
                service
                    .create_todo(list.id, user, NewTodo::new(title))
                    .await
                    .unwrap()
                    .id,
            );
        }

        // The rename parks mid-write while it holds the list's section.
        let update = {
            let service = Arc::clone(&service);
            let id = ids[1];
            tokio::spawn(async move {
                let patch = TodoPatch {
                    title: Some("B renamed".to_string()),
                    ..TodoPatch::default()
                };
                service.update_todo(id, user, patch).await
            })
        };
        store.wait_until_parked().await;

        // The reorder queues on the same section instead of interleaving
        // with the parked write.
        let reorder = {
            let service = Arc::clone(&service);
            let id = ids[2];
            tokio::spawn(async move { service.reorder_todo(id, user, 0).await })
        };
        store.open_gate();
        update.await.unwrap().unwrap();
        reorder.await.unwrap().unwrap();

        let mut todos = store.todos_for_list(list.id).await.unwrap();
        todos.sort_by(|a, b| a.title.cmp(&b.title));
        let orders: Vec<(String, u32)> =
            todos.into_iter().map(|t| (t.title, t.sort_order)).collect();
        assert_eq!(
            orders,
            vec![
                ("A".to_string(), 1),
                ("B renamed".to_string(), 2),
                ("C".to_string(), 0),
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_racing_a_reorder_stays_deleted() {
        let store = GatedStore::new("B");
        let service = Arc::new(TodoOrderingService::new(store.clone()));
        let user = UserId::new();
        let list = seed_list(&service, user, "racing").await;
        let mut ids = vec![];
        for title in ["A", "B", "C"] {
            ids.push(
                service
                    .create_todo(list.id, user, NewTodo::new(title))
                    .await
                    .unwrap()
                    .id,
            );
        }

        // Moving C to the front parks on B's shifted write, section held.
        let reorder = {
            let service = Arc::clone(&service);
            let id = ids[2];
            tokio::spawn(async move { service.reorder_todo(id, user, 0).await })
        };
        store.wait_until_parked().await;

        // The delete queues behind the whole shift instead of landing
        // inside it.
        let delete = {
            let service = Arc::clone(&service);
            let id = ids[1];
            tokio::spawn(async move { service.delete_todo(id, user).await })
        };
        store.open_gate();
        reorder.await.unwrap().unwrap();
        delete.await.unwrap().unwrap();

        assert!(matches!(
            service.get_todo(ids[1], user).await.unwrap_err(),
            EngineError::NotFound { resource: "todo" }
        ));
        let live = store.todos_for_list(list.id).await.unwrap();
        assert_eq!(live.len(), 2);
        let stored = service.get_list(list.id, user).await.unwrap();
        assert_eq!(stored.todo_count, 2);
        assert_eq!(stored.completed_todo_count, 0);
    }

    #[tokio::test]
    async fn test_delete_list_racing_a_list_reorder_stays_deleted() {
        let store = GatedStore::new("b");
        let service = Arc::new(TodoOrderingService::new(store.clone()));
        let user = UserId::new();
        let a = seed_list(&service, user, "a").await;
        let b = seed_list(&service, user, "b").await;
        let c = seed_list(&service, user, "c").await;
        assert_eq!([a.sort_order, b.sort_order, c.sort_order], [0, 1, 2]);
        service
            .create_todo(b.id, user, NewTodo::new("inside b"))
            .await
            .unwrap();

        // Moving c to the front parks on b's shifted write, the user's
        // section held.
        let reorder = {
            let service = Arc::clone(&service);
            let id = c.id;
            tokio::spawn(async move { service.reorder_list(id, user, 0).await })
        };
        store.wait_until_parked().await;

        // The cascade delete queues on the user's section instead of
        // landing inside the shift.
        let delete = {
            let service = Arc::clone(&service);
            let id = b.id;
            tokio::spawn(async move { service.delete_list(id, user).await })
        };
        store.open_gate();
        reorder.await.unwrap().unwrap();
        assert_eq!(delete.await.unwrap().unwrap(), 1);

        assert!(matches!(
            service.get_list(b.id, user).await.unwrap_err(),
            EngineError::NotFound { resource: "list" }
        ));
        let names: Vec<String> = service
            .lists_for_user(user)
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["c", "a"]);
    }

    #[tokio::test]
    async fn test_empty_patch_changes_nothing() {
        let service = service();
        let user = UserId::new();
        let list = seed_list(&service, user, "work").await;
        let todo = service
            .create_todo(list.id, user, NewTodo::new("a"))
            .await
            .unwrap();

        let unchanged = service
            .update_todo(todo.id, user, TodoPatch::default())
            .await
            .unwrap();
        assert_eq!(unchanged.updated_at, todo.updated_at);
    }

    #[tokio::test]
    async fn test_update_clears_due_date_with_explicit_null() {
        let service = service();
        let user = UserId::new();
        let list = seed_list(&service, user, "work").await;
        let mut new = NewTodo::new("due");
        new.due_date = Some(Utc::now() + Duration::days(1));
        let todo = service.create_todo(list.id, user, new).await.unwrap();
        assert!(todo.due_date.is_some());

        let patch = TodoPatch {
            due_date: Some(None),
            ..TodoPatch::default()
        };
        let updated = service.update_todo(todo.id, user, patch).await.unwrap();
        assert_eq!(updated.due_date, None);
    }

    #[tokio::test]
    async fn test_state_survives_reopen_on_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let user = UserId::new();
        let list_id = {
            let store = Arc::new(JsonStore::open(dir.path()).await.unwrap());
            let service = TodoOrderingService::new(store);
            let list = seed_list(&service, user, "persisted").await;
            let a = service
                .create_todo(list.id, user, NewTodo::new("a"))
                .await
                .unwrap();
            service
                .create_todo(list.id, user, NewTodo::new("b"))
                .await
                .unwrap();
            service.set_completed(a.id, user, true).await.unwrap();
            list.id
        };

        let store = Arc::new(JsonStore::open(dir.path()).await.unwrap());
        let service = TodoOrderingService::new(store);
        let list = service.get_list(list_id, user).await.unwrap();
        assert_eq!(list.todo_count, 2);
        assert_eq!(list.completed_todo_count, 1);

        // Order allocation continues where it left off.
        let next = service
            .create_todo(list_id, user, NewTodo::new("c"))
            .await
            .unwrap();
        assert_eq!(next.sort_order, 2);
    }

    #[tokio::test]
    async fn test_search_and_filter_queries() {
        let service = service();
        let user = UserId::new();
        let list = seed_list(&service, user, "work").await;

        let mut groceries = NewTodo::new("Buy milk");
        groceries.tags = Some(vec!["errand".to_string()]);
        service.create_todo(list.id, user, groceries).await.unwrap();

        let mut urgent = NewTodo::new("File taxes");
        urgent.priority = Some(Priority::High);
        service.create_todo(list.id, user, urgent).await.unwrap();

        let page = service
            .list_todos(
                user,
                &TodoQueryParams {
                    search: Some("MILK".to_string()),
                    ..TodoQueryParams::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 1);
        assert_eq!(page.todos[0].title, "Buy milk");

        let page = service
            .list_todos(
                user,
                &TodoQueryParams {
                    priority: Some(Priority::High),
                    ..TodoQueryParams::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 1);
        assert_eq!(page.todos[0].title, "File taxes");

        let page = service
            .list_todos(
                user,
                &TodoQueryParams {
                    tag: Some("errand".to_string()),
                    ..TodoQueryParams::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 1);
    }
}
