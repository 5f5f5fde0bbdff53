//! CLI command implementations for fdgraph.
//!
//! This module provides implementations for all CLI subcommands:
//! - `check`: Capture validation and correlation summary
//! - `config`: Configuration file generation
//! - `generate`: Synthetic capture generation

pub mod check;
pub mod config;
pub mod generate;

// Re-export command functions
pub use check::command_check;
pub use config::command_config;
pub use generate::command_generate_testdata;
