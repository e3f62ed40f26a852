//! Shared fixtures for the engine test modules.

use chrono::Utc;
use roster_core::{List, ListId, Priority, Todo, TodoId, UserId, DEFAULT_COLOR};
use roster_storage::SharedStore;

pub(crate) fn list(name: &str) -> List {
    let now = Utc::now();
    List {
        id: ListId::new(),
        user_id: UserId::new(),
        name: name.to_string(),
        description: String::new(),
        color: DEFAULT_COLOR.to_string(),
        is_public: false,
        todo_count: 0,
        completed_todo_count: 0,
        sort_order: 0,
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn todo(list: &List, title: &str, order: u32) -> Todo {
    let now = Utc::now();
    Todo {
        id: TodoId::new(),
        list_id: list.id,
        user_id: list.user_id,
        title: title.to_string(),
        description: String::new(),
        priority: Priority::Medium,
        due_date: None,
        tags: vec![],
        completed: false,
        completed_at: None,
        sort_order: order,
        estimated_minutes: None,
        actual_minutes: None,
        created_at: now,
        updated_at: now,
    }
}

/// Inserts one todo per title, ordered 0..n, returning the ids in order.
pub(crate) async fn insert_todos(store: &SharedStore, list: &List, titles: &[&str]) -> Vec<TodoId> {
    let mut ids = Vec::new();
    for (i, title) in titles.iter().enumerate() {
        let t = todo(list, title, i as u32);
        ids.push(t.id);
        store.insert_todo(&t).await.unwrap();
    }
    ids
}
