//! Per-process reads from the proc filesystem.
//!
//! A record is assembled from two independent reads, `/proc/<pid>/stat` for
//! the state and `/proc/<pid>/comm` for the short name. The process may exit
//! between the two; the result then degrades to `Unknown` instead of failing.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::trace;

use super::state::{classify_field, ProcessState};

/// Name reported when `comm` cannot be read.
pub const UNKNOWN_NAME: &str = "Unknown";

/// One process as seen during a single snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub pid: u32,
    pub name: String,
    pub state: ProcessState,
}

/// Reads process records below a proc root (normally `/proc`).
#[derive(Debug, Clone)]
pub struct ProcessReader {
    root: PathBuf,
}

impl ProcessReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn proc_path(&self, pid: u32) -> PathBuf {
        self.root.join(pid.to_string())
    }

    /// Reads the full record for `pid`. Never fails.
    pub fn read(&self, pid: u32) -> ProcessRecord {
        ProcessRecord {
            pid,
            name: self.read_name(pid),
            state: self.read_state(pid).unwrap_or(ProcessState::Unknown),
        }
    }

    /// Reads the state from the stat line.
    ///
    /// Returns `None` only when the stat file could not be read at all; a
    /// readable but malformed line yields `Some(Unknown)`.
    pub fn read_state(&self, pid: u32) -> Option<ProcessState> {
        let stat = self.proc_path(pid).join("stat");
        match fs::read(&stat) {
            Ok(bytes) => {
                // Names may hold arbitrary bytes.
                let content = String::from_utf8_lossy(&bytes);
                let line = content.lines().next().unwrap_or("");
                Some(classify_field(state_field(line)))
            }
            Err(e) => {
                trace!("Cannot read {}: {}", stat.display(), e);
                None
            }
        }
    }

    /// Reads the short command name, falling back to [`UNKNOWN_NAME`].
    pub fn read_name(&self, pid: u32) -> String {
        read_comm(&self.proc_path(pid)).unwrap_or_else(|| UNKNOWN_NAME.to_string())
    }
}

fn read_comm(proc_path: &Path) -> Option<String> {
    let comm = proc_path.join("comm");
    match fs::read(&comm) {
        Ok(bytes) => {
            let s = String::from_utf8_lossy(&bytes);
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        }
        Err(e) => {
            trace!("Cannot read {}: {}", comm.display(), e);
            None
        }
    }
}

/// Extracts the state field from a stat line.
///
/// This is the third whitespace-delimited token. A command name containing
/// spaces shifts the tokens, so when the name is parenthesised the field is
/// taken as the first token after the closing parenthesis instead.
pub fn state_field(line: &str) -> Option<&str> {
    if let Some(close) = line.rfind(')') {
        if line[..close].contains('(') {
            return line[close + 1..].split_whitespace().next();
        }
    }
    line.split_whitespace().nth(2)
}
