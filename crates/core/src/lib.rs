//! Roster Core - shared data model
//!
//! Contains:
//! - Todo/List: the two document types and their request structs
//! - TodoFilter/TodoSort: query semantics shared by all store backends
//! - ValidationError: field-level rejection
//! - RosterConfig: workspace configuration

mod config;
mod error;
mod ids;
mod list;
mod query;
mod todo;

pub use config::*;
pub use error::*;
pub use ids::*;
pub use list::*;
pub use query::*;
pub use todo::*;
