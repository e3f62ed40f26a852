//! Engine error taxonomy.
//!
//! Every fallible operation on the service facade returns one of these
//! kinds; callers branch on the kind, not on message text.

use roster_core::ValidationError;
use roster_storage::StoreError;
use thiserror::Error;

/// Failure surfaced by the ordering and aggregate engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Target does not exist, or is invisible to the requesting user.
    #[error("{resource} not found")]
    NotFound { resource: &'static str },

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Requested sort order cannot be represented.
    #[error("sort order {0} is out of range")]
    OutOfRange(i64),

    /// State clash, such as a taken list name or running out of
    /// attempts while allocating a sort order.
    #[error("{0}")]
    Conflict(String),

    /// Target is visible to the user but owned by someone else.
    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    pub fn not_found(resource: &'static str) -> Self {
        EngineError::NotFound { resource }
    }

    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::NotFound { .. } => "not_found",
            EngineError::Validation(_) => "validation",
            EngineError::OutOfRange(_) => "out_of_range",
            EngineError::Conflict(_) => "conflict",
            EngineError::Forbidden(_) => "forbidden",
            EngineError::Store(_) => "storage",
        }
    }
}
