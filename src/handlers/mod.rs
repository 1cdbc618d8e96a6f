//! HTTP endpoint handlers for the server.
//!
//! This module provides handlers for all HTTP endpoints:
//! - `/`: HTML dashboard with process table, state chart, listing and actions
//! - `/health`: Refresh status
//! - `/processes`, `/states`, `/snapshot`, `/paused`: Snapshot views
//! - `/top`: External listing
//! - `/pause/{pid}`, `/resume/{pid}`, `/kill/{pid}`, `/actions`: Lifecycle actions

pub mod actions;
pub mod health;
pub mod processes;
pub mod root;
pub mod top;

// Re-export handlers
pub use actions::{form_action_handler, kill_handler, pause_handler, resume_handler};
pub use health::health_handler;
pub use processes::{paused_handler, processes_handler, snapshot_handler, states_handler};
pub use root::root_handler;
pub use top::top_handler;
