//! Todo list model with its denormalized counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::ids::{ListId, UserId};

/// Longest accepted list name, in characters.
pub const MAX_NAME_LEN: usize = 100;
/// Longest accepted list description, in characters.
pub const MAX_LIST_DESCRIPTION_LEN: usize = 500;
/// Color applied when a list is created without one.
pub const DEFAULT_COLOR: &str = "#3b82f6";

/// A named collection of todos belonging to one user.
///
/// `todo_count` and `completed_todo_count` are denormalized read-path
/// copies. They are recomputed from the todos after every mutation that
/// can change them and must never be incremented in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    pub id: ListId,
    pub user_id: UserId,
    pub name: String,
    pub description: String,
    /// Display color as `#rrggbb`.
    pub color: String,
    pub is_public: bool,
    pub todo_count: u64,
    pub completed_todo_count: u64,
    /// Position among the owner's lists, zero-based.
    pub sort_order: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl List {
    /// Applies a validated patch.
    pub fn apply_patch(&mut self, patch: ListPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(is_public) = patch.is_public {
            self.is_public = is_public;
        }
        self.updated_at = now;
    }
}

/// Fields accepted when creating a list.
#[derive(Debug, Clone, Default)]
pub struct NewList {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub is_public: Option<bool>,
}

impl NewList {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Trims free-text fields and checks every limit, returning the cleaned
    /// request on success.
    pub fn validated(mut self) -> Result<Self, ValidationError> {
        self.name = validate_name(&self.name)?;
        if let Some(description) = self.description {
            self.description = Some(validate_list_description(&description)?);
        }
        if let Some(color) = &self.color {
            validate_color(color)?;
        }
        Ok(self)
    }
}

/// Partial update for a list. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ListPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub is_public: Option<bool>,
}

impl ListPatch {
    /// Trims and checks the fields that are present, returning the cleaned
    /// patch on success.
    pub fn validated(mut self) -> Result<Self, ValidationError> {
        if let Some(name) = self.name {
            self.name = Some(validate_name(&name)?);
        }
        if let Some(description) = self.description {
            self.description = Some(validate_list_description(&description)?);
        }
        if let Some(color) = &self.color {
            validate_color(color)?;
        }
        Ok(self)
    }
}

fn validate_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::new("list name must not be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::new(format!(
            "list name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

fn validate_list_description(description: &str) -> Result<String, ValidationError> {
    let description = description.trim();
    if description.chars().count() > MAX_LIST_DESCRIPTION_LEN {
        return Err(ValidationError::new(format!(
            "list description must be at most {MAX_LIST_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(description.to_string())
}

fn validate_color(color: &str) -> Result<(), ValidationError> {
    let mut chars = color.chars();
    let well_formed = chars.next() == Some('#')
        && color.len() == 7
        && chars.all(|c| c.is_ascii_hexdigit());
    if well_formed {
        Ok(())
    } else {
        Err(ValidationError::new(format!(
            "color '{color}' is not a #rrggbb value"
        )))
    }
}
