//! Snapshot of all processes below the proc root.
//!
//! Enumerates numeric directory entries, reads each process and aggregates
//! per-state counts in first-seen order so charts keep a stable layout
//! between ticks.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use super::reader::{ProcessReader, ProcessRecord};
use super::state::ProcessState;

/// Options for snapshot collection.
#[derive(Debug, Clone)]
pub struct SnapshotOptions {
    /// Skip pids whose stat file could not be read (they exited mid-scan).
    pub skip_unreadable: bool,
    /// Stop after this many processes.
    pub max_processes: Option<usize>,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            skip_unreadable: true,
            max_processes: None,
        }
    }
}

/// All processes observed in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub records: Vec<ProcessRecord>,
    /// Histogram of `records[*].state`, ordered by first appearance.
    pub state_counts: Vec<(ProcessState, usize)>,
}

impl Snapshot {
    /// Builds a snapshot from records, deriving the state counts.
    pub fn from_records(records: Vec<ProcessRecord>) -> Self {
        let state_counts = count_states(&records);
        Self {
            records,
            state_counts,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Count for a single state, zero if absent.
    pub fn count(&self, state: ProcessState) -> usize {
        self.state_counts
            .iter()
            .find(|(s, _)| *s == state)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }

    /// Share of each state in percent, in first-seen order.
    pub fn state_percentages(&self) -> Vec<(ProcessState, f64)> {
        let total = self.records.len();
        if total == 0 {
            return Vec::new();
        }
        self.state_counts
            .iter()
            .map(|(s, c)| (*s, (*c as f64 * 100.0) / total as f64))
            .collect()
    }
}

/// Groups records by state, preserving the order in which states first appear.
pub fn count_states(records: &[ProcessRecord]) -> Vec<(ProcessState, usize)> {
    let mut counts: Vec<(ProcessState, usize)> = Vec::new();
    for record in records {
        match counts.iter_mut().find(|(s, _)| *s == record.state) {
            Some((_, c)) => *c += 1,
            None => counts.push((record.state, 1)),
        }
    }
    counts
}

/// Lists pid-shaped entries of a proc root, in directory order.
///
/// Non-numeric entries (`self`, `sys`, `meminfo`, ...) and pid 0 are skipped.
pub fn list_pids(root: &Path) -> Vec<u32> {
    let mut out = Vec::new();
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot list {}: {}", root.display(), e);
            return out;
        }
    };
    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = match name.to_str() {
            Some(v) => v,
            None => continue,
        };
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        let pid: u32 = match name.parse() {
            Ok(v) if v > 0 => v,
            _ => continue,
        };
        out.push(pid);
    }
    out
}

/// Produces snapshots from a [`ProcessReader`].
#[derive(Debug, Clone)]
pub struct SnapshotEngine {
    reader: ProcessReader,
    options: SnapshotOptions,
}

impl SnapshotEngine {
    pub fn new(reader: ProcessReader, options: SnapshotOptions) -> Self {
        Self { reader, options }
    }

    /// Takes one synchronous snapshot. Never fails; an unreadable root gives
    /// an empty snapshot.
    pub fn snapshot(&self) -> Snapshot {
        let pids = list_pids(self.reader.root());
        let mut records = Vec::with_capacity(pids.len());
        let mut skipped = 0usize;

        for pid in pids {
            if let Some(max) = self.options.max_processes {
                if records.len() >= max {
                    break;
                }
            }

            let state = match self.reader.read_state(pid) {
                Some(state) => state,
                None if self.options.skip_unreadable => {
                    skipped += 1;
                    continue;
                }
                None => ProcessState::Unknown,
            };
            records.push(ProcessRecord {
                pid,
                name: self.reader.read_name(pid),
                state,
            });
        }

        if skipped > 0 {
            debug!("Skipped {} processes with unreadable stat", skipped);
        }

        Snapshot::from_records(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(pid: u32, state: ProcessState) -> ProcessRecord {
        ProcessRecord {
            pid,
            name: format!("p{}", pid),
            state,
        }
    }

    fn write_proc(root: &Path, pid: &str, code: char, comm: &str) {
        let dir = root.join(pid);
        fs::create_dir_all(&dir).expect("Failed to create pid dir");
        fs::write(
            dir.join("stat"),
            format!("{} ({}) {} 1 1 1 0 -1", pid, comm, code),
        )
        .expect("Failed to write stat");
        fs::write(dir.join("comm"), format!("{}\n", comm)).expect("Failed to write comm");
    }

    #[test]
    fn test_count_states_first_seen_order() {
        let records = vec![
            record(1, ProcessState::Running),
            record(2, ProcessState::Sleeping),
            record(3, ProcessState::Sleeping),
            record(4, ProcessState::Zombie),
        ];
        let counts = count_states(&records);
        assert_eq!(
            counts,
            vec![
                (ProcessState::Running, 1),
                (ProcessState::Sleeping, 2),
                (ProcessState::Zombie, 1),
            ]
        );
    }

    #[test]
    fn test_count_states_not_alphabetical() {
        let records = vec![
            record(1, ProcessState::Zombie),
            record(2, ProcessState::Running),
            record(3, ProcessState::Zombie),
        ];
        let order: Vec<ProcessState> = count_states(&records).into_iter().map(|(s, _)| s).collect();
        assert_eq!(order, vec![ProcessState::Zombie, ProcessState::Running]);
    }

    #[test]
    fn test_percentages() {
        let snap = Snapshot::from_records(vec![
            record(1, ProcessState::Running),
            record(2, ProcessState::Sleeping),
            record(3, ProcessState::Sleeping),
            record(4, ProcessState::Sleeping),
        ]);
        let pct = snap.state_percentages();
        assert_eq!(pct[0], (ProcessState::Running, 25.0));
        assert_eq!(pct[1], (ProcessState::Sleeping, 75.0));
        assert!(Snapshot::default().state_percentages().is_empty());
    }

    #[test]
    fn test_list_pids_filters_non_numeric() {
        let dir = tempdir().expect("Failed to create temp dir");
        for name in ["1", "42", "self", "sys", "meminfo", "12a", "0"] {
            fs::create_dir_all(dir.path().join(name)).expect("Failed to create dir");
        }
        let mut pids = list_pids(dir.path());
        pids.sort_unstable();
        assert_eq!(pids, vec![1, 42]);
    }

    #[test]
    fn test_list_pids_missing_root() {
        let dir = tempdir().expect("Failed to create temp dir");
        assert!(list_pids(&dir.path().join("nope")).is_empty());
    }

    #[test]
    fn test_snapshot_fake_proc() {
        let dir = tempdir().expect("Failed to create temp dir");
        write_proc(dir.path(), "1", 'S', "systemd");
        write_proc(dir.path(), "200", 'R', "cargo");
        write_proc(dir.path(), "300", 'Z', "defunct");
        fs::create_dir_all(dir.path().join("self")).expect("Failed to create dir");

        let engine = SnapshotEngine::new(ProcessReader::new(dir.path()), SnapshotOptions::default());
        let snap = engine.snapshot();

        assert_eq!(snap.len(), 3);
        assert_eq!(snap.count(ProcessState::Sleeping), 1);
        assert_eq!(snap.count(ProcessState::Running), 1);
        assert_eq!(snap.count(ProcessState::Zombie), 1);
        let total: usize = snap.state_counts.iter().map(|(_, c)| c).sum();
        assert_eq!(total, snap.len());
    }

    #[test]
    fn test_snapshot_skip_unreadable() {
        let dir = tempdir().expect("Failed to create temp dir");
        write_proc(dir.path(), "5", 'S', "alive");
        // Directory without stat, like a process that exited mid-scan.
        fs::create_dir_all(dir.path().join("6")).expect("Failed to create dir");

        let reader = ProcessReader::new(dir.path());
        let skipping = SnapshotEngine::new(reader.clone(), SnapshotOptions::default());
        assert_eq!(skipping.snapshot().len(), 1);

        let keeping = SnapshotEngine::new(
            reader,
            SnapshotOptions {
                skip_unreadable: false,
                max_processes: None,
            },
        );
        let snap = keeping.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap.count(ProcessState::Unknown), 1);
        let ghost = snap.records.iter().find(|r| r.pid == 6).expect("pid 6 missing");
        assert_eq!(ghost.name, "Unknown");
    }

    #[test]
    fn test_snapshot_max_processes() {
        let dir = tempdir().expect("Failed to create temp dir");
        for pid in 1..=5 {
            write_proc(dir.path(), &pid.to_string(), 'S', "sleeper");
        }
        let engine = SnapshotEngine::new(
            ProcessReader::new(dir.path()),
            SnapshotOptions {
                skip_unreadable: true,
                max_processes: Some(2),
            },
        );
        assert_eq!(engine.snapshot().len(), 2);
    }
}
