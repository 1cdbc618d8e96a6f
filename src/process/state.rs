//! Process run-state classification.
//!
//! Maps the single-character state code found in `/proc/<pid>/stat` to a
//! [`ProcessState`]. The mapping is total: any code outside the known set,
//! including a missing field, classifies as [`ProcessState::Unknown`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Run state of a process as reported by the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessState {
    Running,
    Sleeping,
    /// Uninterruptible sleep, usually waiting on I/O.
    Waiting,
    Zombie,
    Stopped,
    Unknown,
}

impl ProcessState {
    /// All states, in declaration order.
    pub const ALL: [ProcessState; 6] = [
        ProcessState::Running,
        ProcessState::Sleeping,
        ProcessState::Waiting,
        ProcessState::Zombie,
        ProcessState::Stopped,
        ProcessState::Unknown,
    ];

    /// Human-readable state name used in tables, charts and reports.
    pub fn name(self) -> &'static str {
        match self {
            ProcessState::Running => "Running",
            ProcessState::Sleeping => "Sleeping",
            ProcessState::Waiting => "Waiting",
            ProcessState::Zombie => "Zombie",
            ProcessState::Stopped => "Stopped",
            ProcessState::Unknown => "Unknown",
        }
    }

    /// Parses a state name as produced by [`ProcessState::name`].
    pub fn from_name(name: &str) -> Option<ProcessState> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classifies a raw kernel state code.
pub fn classify(code: char) -> ProcessState {
    match code {
        'R' => ProcessState::Running,
        'S' => ProcessState::Sleeping,
        'D' => ProcessState::Waiting,
        'Z' => ProcessState::Zombie,
        'T' => ProcessState::Stopped,
        _ => ProcessState::Unknown,
    }
}

/// Classifies the first character of a state field.
///
/// The kernel may append annotation characters after the code; only the
/// first character is significant.
pub fn classify_field(field: Option<&str>) -> ProcessState {
    field
        .and_then(|f| f.chars().next())
        .map(classify)
        .unwrap_or(ProcessState::Unknown)
}
