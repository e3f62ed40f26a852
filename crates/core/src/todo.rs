//! Todo document model and the request types that create and patch it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::ids::{ListId, TodoId, UserId};

/// Longest accepted todo title, in characters.
pub const MAX_TITLE_LEN: usize = 200;
/// Longest accepted todo description, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 1000;
/// Most tags a single todo may carry.
pub const MAX_TAGS: usize = 10;
/// Longest accepted tag, in characters.
pub const MAX_TAG_LEN: usize = 50;

/// Todo priority. Ordering is `Low < Medium < High` so sorts can derive from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        };
        f.write_str(s)
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(ValidationError::new(format!(
                "unknown priority '{other}', expected low, medium or high"
            ))),
        }
    }
}

/// A single todo item, owned by a user and positioned inside one list.
///
/// `sort_order` is unique within the list but may contain gaps after
/// deletions. Counters on the owning [`crate::List`] are derived from the
/// todos and never authoritative on their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub list_id: ListId,
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    /// Position within the owning list, zero-based.
    pub sort_order: u32,
    pub estimated_minutes: Option<u32>,
    pub actual_minutes: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// An incomplete todo whose due date lies strictly in the past.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < now)
    }

    /// Applies a validated patch, maintaining the completion timestamp.
    pub fn apply_patch(&mut self, patch: TodoPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(estimated) = patch.estimated_minutes {
            self.estimated_minutes = estimated;
        }
        if let Some(actual) = patch.actual_minutes {
            self.actual_minutes = actual;
        }
        if let Some(completed) = patch.completed {
            if completed && !self.completed {
                self.completed_at = Some(now);
            } else if !completed {
                self.completed_at = None;
            }
            self.completed = completed;
        }
        self.updated_at = now;
    }
}

/// Fields accepted when creating a todo.
#[derive(Debug, Clone, Default)]
pub struct NewTodo {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<DateTime<Utc>>,
    pub tags: Option<Vec<String>>,
    pub estimated_minutes: Option<u32>,
}

impl NewTodo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Trims free-text fields and checks every limit, returning the cleaned
    /// request on success.
    pub fn validated(mut self) -> Result<Self, ValidationError> {
        self.title = validate_title(&self.title)?;
        if let Some(description) = self.description {
            self.description = Some(validate_description(&description)?);
        }
        if let Some(tags) = self.tags {
            self.tags = Some(validate_tags(tags)?);
        }
        if let Some(estimated) = self.estimated_minutes {
            validate_minutes("estimated_minutes", estimated)?;
        }
        Ok(self)
    }
}

/// Partial update for a todo. `None` leaves a field untouched; the nested
/// options distinguish "clear the value" from "leave it alone".
#[derive(Debug, Clone, Default)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub tags: Option<Vec<String>>,
    pub completed: Option<bool>,
    pub estimated_minutes: Option<Option<u32>>,
    pub actual_minutes: Option<Option<u32>>,
}

impl TodoPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.tags.is_none()
            && self.completed.is_none()
            && self.estimated_minutes.is_none()
            && self.actual_minutes.is_none()
    }

    /// Trims and checks the fields that are present, returning the cleaned
    /// patch on success.
    pub fn validated(mut self) -> Result<Self, ValidationError> {
        if let Some(title) = self.title {
            self.title = Some(validate_title(&title)?);
        }
        if let Some(description) = self.description {
            self.description = Some(validate_description(&description)?);
        }
        if let Some(tags) = self.tags {
            self.tags = Some(validate_tags(tags)?);
        }
        if let Some(Some(estimated)) = self.estimated_minutes {
            validate_minutes("estimated_minutes", estimated)?;
        }
        if let Some(Some(actual)) = self.actual_minutes {
            validate_minutes("actual_minutes", actual)?;
        }
        Ok(self)
    }
}

fn validate_title(title: &str) -> Result<String, ValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ValidationError::new("title must not be empty"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ValidationError::new(format!(
            "title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(title.to_string())
}

fn validate_description(description: &str) -> Result<String, ValidationError> {
    let description = description.trim();
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::new(format!(
            "description must be at most {MAX_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(description.to_string())
}

fn validate_tags(tags: Vec<String>) -> Result<Vec<String>, ValidationError> {
    if tags.len() > MAX_TAGS {
        return Err(ValidationError::new(format!(
            "at most {MAX_TAGS} tags are allowed"
        )));
    }
    let mut cleaned = Vec::with_capacity(tags.len());
    for tag in &tags {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(ValidationError::new("tags must not be empty"));
        }
        if tag.chars().count() > MAX_TAG_LEN {
            return Err(ValidationError::new(format!(
                "tag '{tag}' exceeds {MAX_TAG_LEN} characters"
            )));
        }
        if cleaned.iter().any(|seen: &String| seen == tag) {
            return Err(ValidationError::new(format!("duplicate tag '{tag}'")));
        }
        cleaned.push(tag.to_string());
    }
    Ok(cleaned)
}

fn validate_minutes(field: &str, minutes: u32) -> Result<(), ValidationError> {
    if minutes == 0 {
        return Err(ValidationError::new(format!(
            "{field} must be a positive number of minutes"
        )));
    }
    Ok(())
}
