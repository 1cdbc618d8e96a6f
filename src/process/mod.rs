//! Process snapshot modules.
//!
//! This module provides:
//! - `state`: Kernel state code classification
//! - `reader`: Per-process reads from /proc/<pid>/{stat,comm}
//! - `snapshot`: Process enumeration and per-state counting

pub mod reader;
pub mod snapshot;
pub mod state;

// Re-export commonly used types
pub use reader::{state_field, ProcessReader, ProcessRecord, UNKNOWN_NAME};
pub use snapshot::{count_states, list_pids, Snapshot, SnapshotEngine, SnapshotOptions};
pub use state::{classify, classify_field, ProcessState};
