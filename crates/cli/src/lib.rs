//! Roster CLI - command line interface
//!
//! Responsibilities:
//! - clap command tree over the ordering service
//! - config file loading and store selection
//! - pretty and JSON output rendering

pub mod cli;


pub use cli::{run, CliConfig, CliError, OutputFormat};
