//! JSON file store implementation
//!
//! One pretty-printed JSON file per document, grouped in a `lists/` and a
//! `todos/` directory under the store root. Everything is loaded into an
//! in-process cache on open; writes go to a temp file first and are
//! renamed into place so a crash never leaves a half-written document.

use async_trait::async_trait;
use chrono::Utc;
use roster_core::{List, ListId, Todo, TodoFilter, TodoId, TodoSort, UserId};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::warn;

use crate::trait_::{read_guard, write_guard, Store, StoreError};

/// JSON file store implementation
#[derive(Debug)]
pub struct JsonStore {
    root: PathBuf,
    lists: RwLock<HashMap<ListId, List>>,
    todos: RwLock<HashMap<TodoId, Todo>>,
}

impl JsonStore {
    /// Opens the store at `root`, creating the directory tree when missing
    /// and loading every readable document. Unreadable files are skipped
    /// with a warning instead of failing the whole open.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        let lists_dir = root.join("lists");
        let todos_dir = root.join("todos");

        tokio::fs::create_dir_all(&lists_dir).await?;
        tokio::fs::create_dir_all(&todos_dir).await?;

        let lists = Self::load_lists(&lists_dir).await?;
        let todos = Self::load_todos(&todos_dir).await?;

        Ok(Self {
            root,
            lists: RwLock::new(lists),
            todos: RwLock::new(todos),
        })
    }

    async fn load_lists(dir: &Path) -> Result<HashMap<ListId, List>, StoreError> {
        let mut map = HashMap::new();

        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !entry.file_type().await?.is_file() || !has_json_extension(&path) {
                continue;
            }
            match Self::load_doc::<List>(&path).await {
                Ok(list) => {
                    map.insert(list.id, list);
                }
                Err(e) => warn!("failed to load list {}: {}", path.display(), e),
            }
        }

        Ok(map)
    }

    async fn load_todos(dir: &Path) -> Result<HashMap<TodoId, Todo>, StoreError> {
        let mut map = HashMap::new();

        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !entry.file_type().await?.is_file() || !has_json_extension(&path) {
                continue;
            }
            match Self::load_doc::<Todo>(&path).await {
                Ok(todo) => {
                    map.insert(todo.id, todo);
                }
                Err(e) => warn!("failed to load todo {}: {}", path.display(), e),
            }
        }

        Ok(map)
    }

    async fn load_doc<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
        let content = tokio::fs::read_to_string(path).await?;
        serde_json::from_str(&content).map_err(StoreError::Serialize)
    }

    /// Writes the document to a temp file, then renames it into place.
    async fn write_doc<T: Serialize>(path: &Path, doc: &T) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(doc).map_err(StoreError::Serialize)?;
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, &content).await?;
        tokio::fs::rename(&temp_path, path).await?;
        Ok(())
    }

    fn list_path(&self, id: ListId) -> PathBuf {
        self.root.join("lists").join(format!("{id}.json"))
    }

    fn todo_path(&self, id: TodoId) -> PathBuf {
        self.root.join("todos").join(format!("{id}.json"))
    }
}

fn has_json_extension(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("json")
}

#[async_trait]
impl Store for JsonStore {
    async fn insert_list(&self, list: &List) -> Result<(), StoreError> {
        Self::write_doc(&self.list_path(list.id), list).await?;
        let mut lists = write_guard(&self.lists)?;
        lists.insert(list.id, list.clone());
        Ok(())
    }

    async fn get_list(&self, id: ListId) -> Result<Option<List>, StoreError> {
        {
            let lists = read_guard(&self.lists)?;
            if let Some(list) = lists.get(&id) {
                return Ok(Some(list.clone()));
            }
        }

        // Cache miss; another process may have written the file after open.
        let path = self.list_path(id);
        if !path.exists() {
            return Ok(None);
        }
        let list = Self::load_doc::<List>(&path).await?;
        let mut lists = write_guard(&self.lists)?;
        lists.insert(list.id, list.clone());
        Ok(Some(list))
    }

    async fn put_list(&self, list: &List) -> Result<(), StoreError> {
        Self::write_doc(&self.list_path(list.id), list).await?;
        let mut lists = write_guard(&self.lists)?;
        lists.insert(list.id, list.clone());
        Ok(())
    }

    async fn delete_list(&self, id: ListId) -> Result<bool, StoreError> {
        let path = self.list_path(id);
        if path.exists() {
            tokio::fs::remove_file(&path).await?;
        }
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
        let updated = {
            let lists = read_guard(&self.lists)?;
            let Some(list) = lists.get(&id) else {
                return Ok(false);
            };
            let mut list = list.clone();
            list.todo_count = todo_count;
            list.completed_todo_count = completed_todo_count;
            list.updated_at = Utc::now();
            list
        };

        Self::write_doc(&self.list_path(id), &updated).await?;
        let mut lists = write_guard(&self.lists)?;
        lists.insert(id, updated);
        Ok(true)
    }

    async fn insert_todo(&self, todo: &Todo) -> Result<(), StoreError> {
        {
            let todos = read_guard(&self.todos)?;
            let taken = todos
                .values()
                .any(|t| t.list_id == todo.list_id && t.sort_order == todo.sort_order);
            if taken {
                return Err(StoreError::DuplicateSortOrder {
                    list_id: todo.list_id,
                    order: todo.sort_order,
                });
            }
        }

        Self::write_doc(&self.todo_path(todo.id), todo).await?;
        let mut todos = write_guard(&self.todos)?;
        todos.insert(todo.id, todo.clone());
        Ok(())
    }

    async fn get_todo(&self, id: TodoId) -> Result<Option<Todo>, StoreError> {
        {
            let todos = read_guard(&self.todos)?;
            if let Some(todo) = todos.get(&id) {
                return Ok(Some(todo.clone()));
            }
        }

        let path = self.todo_path(id);
        if !path.exists() {
            return Ok(None);
        }
        let todo = Self::load_doc::<Todo>(&path).await?;
        let mut todos = write_guard(&self.todos)?;
        todos.insert(todo.id, todo.clone());
        Ok(Some(todo))
    }

    async fn put_todo(&self, todo: &Todo) -> Result<(), StoreError> {
        Self::write_doc(&self.todo_path(todo.id), todo).await?;
        let mut todos = write_guard(&self.todos)?;
        todos.insert(todo.id, todo.clone());
        Ok(())
    }

    async fn delete_todo(&self, id: TodoId) -> Result<bool, StoreError> {
        let path = self.todo_path(id);
        if path.exists() {
            tokio::fs::remove_file(&path).await?;
        }
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
        let doomed: Vec<TodoId> = {
            let todos = read_guard(&self.todos)?;
            todos
                .values()
                .filter(|t| t.list_id == list_id)
                .map(|t| t.id)
                .collect()
        };

        for id in &doomed {
            let path = self.todo_path(*id);
            if path.exists() {
                tokio::fs::remove_file(&path).await?;
            }
        }

        let mut todos = write_guard(&self.todos)?;
        for id in &doomed {
            todos.remove(id);
        }
        Ok(doomed.len() as u64)
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
