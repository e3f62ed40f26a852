//! Roster Engine - ordering and aggregate consistency
//!
//! Responsibilities:
//! - Allocate and maintain per-list sort orders, including window moves
//! - Keep denormalized list counters consistent by full recompute
//! - Compute list and user statistics on demand
//! - Build validated, deterministic queries with pagination
//! - Expose one service facade enforcing ownership and visibility

pub mod counter;
pub mod error;
pub mod lock;
pub mod order;
pub mod query;
pub mod service;
pub mod stats;

#[cfg(test)]
mod testutil;

pub use counter::CounterMaintainer;
pub use error::EngineError;
pub use lock::ListLocks;
pub use order::OrderRegistry;
pub use query::{Pagination, QueryFilterBuilder, TodoPage, TodoQuery, TodoQueryParams};
pub use service::{ReorderReceipt, TodoOrderingService};
pub use stats::{ListStats, StatisticsAggregator, UserStats};
