// Roster Storage Layer
//
// Abstract store interface with pluggable backends

pub mod json;
pub mod memory;
pub mod trait_;

pub use json::JsonStore;
pub use memory::{create_memory_store, MemoryStore};
pub use trait_::*;
