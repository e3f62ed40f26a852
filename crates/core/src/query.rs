//! Filter predicate and comparator shared by every store backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::ids::{ListId, UserId};
use crate::todo::{Priority, Todo};

/// Conjunction of optional todo criteria, always scoped to one user.
#[derive(Debug, Clone, PartialEq)]
pub struct TodoFilter {
    pub user_id: UserId,
    pub list_id: Option<ListId>,
    /// Case-insensitive substring over title, description and tags.
    pub search: Option<String>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
    /// Exact tag membership.
    pub tag: Option<String>,
    pub due_from: Option<DateTime<Utc>>,
    pub due_to: Option<DateTime<Utc>>,
}

impl TodoFilter {
    /// A filter matching every todo the user owns.
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id,
            list_id: None,
            search: None,
            priority: None,
            completed: None,
            tag: None,
            due_from: None,
            due_to: None,
        }
    }

    pub fn matches(&self, todo: &Todo) -> bool {
        if todo.user_id != self.user_id {
            return false;
        }
        if let Some(list_id) = self.list_id {
            if todo.list_id != list_id {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if todo.priority != priority {
                return false;
            }
        }
        if let Some(completed) = self.completed {
            if todo.completed != completed {
                return false;
            }
        }
        if let Some(tag) = &self.tag {
            if !todo.tags.iter().any(|t| t == tag) {
                return false;
            }
        }
        if let Some(search) = &self.search {
            if !matches_search(todo, search) {
                return false;
            }
        }
        // A due-date window only matches todos that have a due date.
        if self.due_from.is_some() || self.due_to.is_some() {
            let Some(due) = todo.due_date else {
                return false;
            };
            if self.due_from.is_some_and(|from| due < from) {
                return false;
            }
            if self.due_to.is_some_and(|to| due > to) {
                return false;
            }
        }
        true
    }
}

fn matches_search(todo: &Todo, search: &str) -> bool {
    let needle = search.to_lowercase();
    todo.title.to_lowercase().contains(&needle)
        || todo.description.to_lowercase().contains(&needle)
        || todo.tags.iter().any(|t| t.to_lowercase().contains(&needle))
}

/// Sortable todo fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Title,
    Priority,
    DueDate,
    CreatedAt,
    UpdatedAt,
    SortOrder,
}

impl FromStr for SortField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(SortField::Title),
            "priority" => Ok(SortField::Priority),
            "due_date" => Ok(SortField::DueDate),
            "created_at" => Ok(SortField::CreatedAt),
            "updated_at" => Ok(SortField::UpdatedAt),
            "sort_order" => Ok(SortField::SortOrder),
            other => Err(ValidationError::new(format!("unknown sort field '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(ValidationError::new(format!(
                "unknown sort direction '{other}', expected asc or desc"
            ))),
        }
    }
}

/// Total order over todos for query results.
///
/// Ties on the sort key always fall back to id ascending, whatever the
/// direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TodoSort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for TodoSort {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl TodoSort {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn compare(&self, a: &Todo, b: &Todo) -> Ordering {
        // Absent due dates order before present ones in ascending order.
        let key = match self.field {
            SortField::Title => a.title.cmp(&b.title),
            SortField::Priority => a.priority.cmp(&b.priority),
            SortField::DueDate => a.due_date.cmp(&b.due_date),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortField::SortOrder => a.sort_order.cmp(&b.sort_order),
        };
        let key = match self.direction {
            SortDirection::Asc => key,
            SortDirection::Desc => key.reverse(),
        };
        key.then_with(|| a.id.cmp(&b.id))
    }
}
