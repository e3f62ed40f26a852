//! On-demand statistics
//!
//! Nothing here is stored: every figure is folded from the current todos
//! at request time.

use chrono::{DateTime, Duration, Utc};
use roster_core::{ListId, Priority, Todo, UserId};
use roster_storage::SharedStore;
use serde::Serialize;

use crate::error::EngineError;

/// How far back a completion still counts as recent, in days.
const RECENT_WINDOW_DAYS: i64 = 7;

/// Figures for a single list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ListStats {
    pub total: u64,
    pub completed: u64,
    pub pending: u64,
    /// Incomplete todos whose due date is in the past.
    pub overdue: u64,
    pub high_priority: u64,
    pub medium_priority: u64,
    pub low_priority: u64,
    /// completed / total, rounded to the nearest whole percent. 0 for an
    /// empty list.
    pub completion_percentage: u8,
}

/// Figures across every todo a user owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub total: u64,
    pub completed: u64,
    pub pending: u64,
    pub overdue: u64,
    pub high_priority: u64,
    pub medium_priority: u64,
    pub low_priority: u64,
    pub completion_percentage: u8,
    /// Sum of all estimates, in minutes.
    pub total_estimated_minutes: u64,
    /// Mean estimate over the todos that carry one, rounded. 0 when none do.
    pub avg_estimated_minutes: u64,
    /// Todos completed within the last seven days.
    pub recently_completed: u64,
}

/// Computes stats from live todo documents.
pub struct StatisticsAggregator {
    store: SharedStore,
}

impl StatisticsAggregator {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn list_stats(&self, list_id: ListId) -> Result<ListStats, EngineError> {
        let todos = self.store.todos_for_list(list_id).await?;
        Ok(fold_list_stats(&todos, Utc::now()))
    }

    pub async fn user_stats(&self, user_id: UserId) -> Result<UserStats, EngineError> {
        let todos = self.store.todos_for_user(user_id).await?;
        Ok(fold_user_stats(&todos, Utc::now()))
    }
}

fn fold_list_stats(todos: &[Todo], now: DateTime<Utc>) -> ListStats {
    let total = todos.len() as u64;
    let completed = count(todos, |t| t.completed);
    ListStats {
        total,
        completed,
        pending: total - completed,
        overdue: count(todos, |t| t.is_overdue(now)),
        high_priority: count(todos, |t| t.priority == Priority::High),
        medium_priority: count(todos, |t| t.priority == Priority::Medium),
        low_priority: count(todos, |t| t.priority == Priority::Low),
        completion_percentage: percentage(completed, total),
    }
}

fn fold_user_stats(todos: &[Todo], now: DateTime<Utc>) -> UserStats {
    let total = todos.len() as u64;
    let completed = count(todos, |t| t.completed);

    let estimates: Vec<u64> = todos
        .iter()
        .filter_map(|t| t.estimated_minutes)
        .map(u64::from)
        .collect();
    let total_estimated: u64 = estimates.iter().sum();
    let avg_estimated = if estimates.is_empty() {
        0
    } else {
        (total_estimated as f64 / estimates.len() as f64).round() as u64
    };

    let recent_cutoff = now - Duration::days(RECENT_WINDOW_DAYS);
    let recently_completed = count(todos, |t| {
        t.completed && t.completed_at.is_some_and(|at| at >= recent_cutoff)
    });

    UserStats {
        total,
        completed,
        pending: total - completed,
        overdue: count(todos, |t| t.is_overdue(now)),
        high_priority: count(todos, |t| t.priority == Priority::High),
        medium_priority: count(todos, |t| t.priority == Priority::Medium),
        low_priority: count(todos, |t| t.priority == Priority::Low),
        completion_percentage: percentage(completed, total),
        total_estimated_minutes: total_estimated,
        avg_estimated_minutes: avg_estimated,
        recently_completed,
    }
}

fn count(todos: &[Todo], pred: impl Fn(&Todo) -> bool) -> u64 {
    todos.iter().filter(|t| pred(t)).count() as u64
}

fn percentage(completed: u64, total: u64) -> u8 {
    if total == 0 {
        0
    } else {
        ((completed as f64 / total as f64) * 100.0).round() as u8
    }
}
