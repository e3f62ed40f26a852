//! In-memory store implementation
//!
//! Keeps both collections in process memory. Used by tests and by runs
//! that do not want anything written to disk.

use async_trait::async_trait;
use chrono::Utc;
use roster_core::{List, ListId, Todo, TodoFilter, TodoId, TodoSort, UserId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::trait_::{read_guard, write_guard, SharedStore, Store, StoreError};

/// In-memory store implementation
#[derive(Debug, Default)]
pub struct MemoryStore {
    lists: RwLock<HashMap<ListId, List>>,
    todos: RwLock<HashMap<TodoId, Todo>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_list(&self, list: &List) -> Result<(), StoreError> {
        let mut lists = write_guard(&self.lists)?;
        lists.insert(list.id, list.clone());
        Ok(())
    }

    async fn get_list(&self, id: ListId) -> Result<Option<List>, StoreError> {
        let lists = read_guard(&self.lists)?;
        Ok(lists.get(&id).cloned())
    }

    async fn put_list(&self, list: &List) -> Result<(), StoreError> {
        let mut lists = write_guard(&self.lists)?;
        lists.insert(list.id, list.clone());
        Ok(())
    }

    async fn delete_list(&self, id: ListId) -> Result<bool, StoreError> {
        let mut lists = write_guard(&self.lists)?;
        Ok(lists.remove(&id).is_some())
    }

    async fn lists_for_user(&self, user_id: UserId) -> Result<Vec<List>, StoreError> {
        let lists = read_guard(&self.lists)?;
        Ok(lists
            .values()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_list_by_name(
        &self,
        user_id: UserId,
        name: &str,
    ) -> Result<Option<List>, StoreError> {
        let needle = name.to_lowercase();
        let lists = read_guard(&self.lists)?;
        Ok(lists
            .values()
            .find(|l| l.user_id == user_id && l.name.to_lowercase() == needle)
            .cloned())
    }

    async fn update_list_counters(
        &self,
        id: ListId,
        todo_count: u64,
        completed_todo_count: u64,
    ) -> Result<bool, StoreError> {
        let mut lists = write_guard(&self.lists)?;
        match lists.get_mut(&id) {
            Some(list) => {
                list.todo_count = todo_count;
                list.completed_todo_count = completed_todo_count;
                list.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_todo(&self, todo: &Todo) -> Result<(), StoreError> {
        let mut todos = write_guard(&self.todos)?;
        let taken = todos
            .values()
            .any(|t| t.list_id == todo.list_id && t.sort_order == todo.sort_order);
        if taken {
            return Err(StoreError::DuplicateSortOrder {
                list_id: todo.list_id,
                order: todo.sort_order,
            });
        }
        todos.insert(todo.id, todo.clone());
        Ok(())
    }

    async fn get_todo(&self, id: TodoId) -> Result<Option<Todo>, StoreError> {
        let todos = read_guard(&self.todos)?;
        Ok(todos.get(&id).cloned())
    }

    async fn put_todo(&self, todo: &Todo) -> Result<(), StoreError> {
        let mut todos = write_guard(&self.todos)?;
        todos.insert(todo.id, todo.clone());
        Ok(())
    }

    async fn delete_todo(&self, id: TodoId) -> Result<bool, StoreError> {
        let mut todos = write_guard(&self.todos)?;
        Ok(todos.remove(&id).is_some())
    }

    async fn todos_for_list(&self, list_id: ListId) -> Result<Vec<Todo>, StoreError> {
        let todos = read_guard(&self.todos)?;
        Ok(todos
            .values()
            .filter(|t| t.list_id == list_id)
            .cloned()
            .collect())
    }

    async fn todos_for_user(&self, user_id: UserId) -> Result<Vec<Todo>, StoreError> {
        let todos = read_guard(&self.todos)?;
        Ok(todos
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete_todos_for_list(&self, list_id: ListId) -> Result<u64, StoreError> {
        let mut todos = write_guard(&self.todos)?;
        let before = todos.len();
        todos.retain(|_, t| t.list_id != list_id);
        Ok((before - todos.len()) as u64)
    }

    async fn count_todos(&self, filter: &TodoFilter) -> Result<u64, StoreError> {
        let todos = read_guard(&self.todos)?;
        Ok(todos.values().filter(|t| filter.matches(t)).count() as u64)
    }

    async fn query_todos(
        &self,
        filter: &TodoFilter,
        sort: &TodoSort,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Todo>, StoreError> {
        let todos = read_guard(&self.todos)?;
        let mut matched: Vec<Todo> =
            todos.values().filter(|t| filter.matches(t)).cloned().collect();
        matched.sort_by(|a, b| sort.compare(a, b));
        Ok(matched
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}

/// Create a new shared in-memory store
pub fn create_memory_store() -> SharedStore {
    Arc::new(MemoryStore::new())
}
