//! CLI command implementations for procwatch.
//!
//! This module provides implementations for all CLI subcommands:
//! - `snapshot`: One process snapshot with state counts
//! - `top`: One external listing
//! - `kill`: One-shot forceful termination
//! - `report`: Process status report file
//! - `chart`: Bar chart from a report file
//! - `config`: Configuration file generation
//! - `check`: System validation

pub mod chart;
pub mod check;
pub mod config;
pub mod kill;
pub mod report;
pub mod snapshot;
pub mod top;

// Re-export command functions
pub use chart::command_chart;
pub use check::command_check;
pub use config::command_config;
pub use kill::command_kill;
pub use report::command_report;
pub use snapshot::command_snapshot;
pub use top::command_top;
