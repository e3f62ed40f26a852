//! Query building and pagination
//!
//! Turns raw, transport-shaped parameters into a validated
//! [`TodoFilter`] plus sort and page window. Invalid parameters are
//! rejected here, before any store access.

use chrono::{DateTime, Utc};
use roster_core::{
    EngineConfig, ListId, Priority, SortDirection, SortField, Todo, TodoFilter, TodoSort, UserId,
    ValidationError,
};
use serde::Serialize;

use crate::error::EngineError;

/// Raw query parameters as a caller hands them over. Everything is
/// optional; defaults are applied during [`QueryFilterBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct TodoQueryParams {
    pub list_id: Option<ListId>,
    pub search: Option<String>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
    pub tag: Option<String>,
    pub due_from: Option<DateTime<Utc>>,
    pub due_to: Option<DateTime<Utc>>,
    pub sort_by: Option<SortField>,
    pub direction: Option<SortDirection>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// A validated query: filter, total order and page window.
#[derive(Debug, Clone)]
pub struct TodoQuery {
    pub filter: TodoFilter,
    pub sort: TodoSort,
    pub page: u32,
    pub limit: u32,
}

impl TodoQuery {
    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

/// Validates raw parameters against configured page bounds.
pub struct QueryFilterBuilder {
    default_limit: u32,
    max_limit: u32,
}

impl QueryFilterBuilder {
    pub fn new(default_limit: u32, max_limit: u32) -> Self {
        Self {
            default_limit,
            max_limit,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.default_page_limit, config.max_page_limit)
    }

    pub fn build(
        &self,
        user_id: UserId,
        params: &TodoQueryParams,
    ) -> Result<TodoQuery, EngineError> {
        let page = params.page.unwrap_or(1);
        if page == 0 {
            return Err(invalid("page must be at least 1"));
        }
        let limit = params.limit.unwrap_or(self.default_limit);
        if limit == 0 || limit > self.max_limit {
            return Err(invalid(format!(
                "limit must be between 1 and {}",
                self.max_limit
            )));
        }
        if let (Some(from), Some(to)) = (params.due_from, params.due_to) {
            if from > to {
                return Err(invalid("due_from must not be after due_to"));
            }
        }

        let mut filter = TodoFilter::for_user(user_id);
        filter.list_id = params.list_id;
        filter.search = non_blank(&params.search);
        filter.priority = params.priority;
        filter.completed = params.completed;
        filter.tag = non_blank(&params.tag);
        filter.due_from = params.due_from;
        filter.due_to = params.due_to;

        let sort = TodoSort::new(
            params.sort_by.unwrap_or(SortField::CreatedAt),
            params.direction.unwrap_or(SortDirection::Desc),
        );

        Ok(TodoQuery {
            filter,
            sort,
            page,
            limit,
        })
    }
}

fn invalid(message: impl Into<String>) -> EngineError {
    EngineError::Validation(ValidationError::new(message))
}

/// Blank strings count as absent.
fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Page envelope returned with every query result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// 1-based page that was returned.
    pub current: u32,
    /// Total pages at this limit; 0 when nothing matched.
    pub pages: u64,
    /// Matching documents across all pages.
    pub total: u64,
    pub limit: u32,
}

impl Pagination {
    pub(crate) fn new(current: u32, limit: u32, total: u64) -> Self {
        Self {
            current,
            pages: total.div_ceil(limit as u64),
            total,
            limit,
        }
    }
}

/// One page of todos with its envelope.
#[derive(Debug, Clone, Serialize)]
pub struct TodoPage {
    pub todos: Vec<Todo>,
    pub pagination: Pagination,
}
