//! Workspace configuration, deserialized from an optional JSON file.
//!
//! Every field has a default so a missing or partial file still yields a
//! usable configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration shared by the CLI and the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Where documents are kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the JSON document tree. `None` lets the caller
    /// pick its own default.
    #[serde(default)]
    pub root: Option<PathBuf>,
    /// Keep documents in memory only, discarding them on exit.
    #[serde(default = "default_in_memory")]
    pub in_memory: bool,
}

fn default_in_memory() -> bool {
    false
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: None,
            in_memory: default_in_memory(),
        }
    }
}

/// Tunables for ordering and queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Attempts at allocating a unique sort order before giving up.
    #[serde(default = "default_insert_retries")]
    pub insert_retries: u32,
    /// Page size applied when a query does not ask for one.
    #[serde(default = "default_page_limit")]
    pub default_page_limit: u32,
    /// Largest accepted page size.
    #[serde(default = "default_max_page_limit")]
    pub max_page_limit: u32,
}

fn default_insert_retries() -> u32 {
    3
}

fn default_page_limit() -> u32 {
    10
}

fn default_max_page_limit() -> u32 {
    100
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            insert_retries: default_insert_retries(),
            default_page_limit: default_page_limit(),
            max_page_limit: default_max_page_limit(),
        }
    }
}
