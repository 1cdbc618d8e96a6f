//! Integration tests for snapshots.
//!
//! Fake proc trees built in temporary directories cover exact scenarios;
//! the real /proc covers the invariants.

use procwatch::{ProcessReader, ProcessState, Snapshot, SnapshotEngine, SnapshotOptions};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// Helper function to create one fake process directory.
fn fake_process(root: &Path, pid: u32, name: &str, code: &str) {
    let dir = root.join(pid.to_string());
    fs::create_dir_all(&dir).expect("Failed to create pid dir");
    fs::write(
        dir.join("stat"),
        format!("{pid} ({name}) {code} 1 {pid} {pid} 0 -1 4194560 0 0 0 0 0 0 0 0 20 0 1 0 1"),
    )
    .expect("Failed to write stat");
    fs::write(dir.join("comm"), format!("{name}\n")).expect("Failed to write comm");
}

/// Helper function to build an engine over a root.
fn engine(root: &Path) -> SnapshotEngine {
    SnapshotEngine::new(ProcessReader::new(root), SnapshotOptions::default())
}

/// Checks the histogram invariant of a snapshot.
fn assert_counts_consistent(snapshot: &Snapshot) {
    let total: usize = snapshot.state_counts.iter().map(|(_, c)| c).sum();
    assert_eq!(total, snapshot.records.len());
    for record in &snapshot.records {
        assert!(snapshot.count(record.state) > 0, "missing {:?}", record.state);
    }
    assert!(snapshot.state_counts.iter().all(|(_, c)| *c > 0));
}

#[test]
fn test_bash_sleeping_scenario() {
    let dir = tempdir().expect("Failed to create temp dir");
    fake_process(dir.path(), 1234, "bash", "S");

    let snapshot = engine(dir.path()).snapshot();
    assert_eq!(snapshot.records.len(), 1);
    let record = &snapshot.records[0];
    assert_eq!(record.pid, 1234);
    assert_eq!(record.name, "bash");
    assert_eq!(record.state, ProcessState::Sleeping);
}

#[test]
fn test_state_counts_for_r_s_s_z() {
    let records = ["R", "S", "S", "Z"]
        .iter()
        .enumerate()
        .map(|(i, code)| procwatch::ProcessRecord {
            pid: i as u32 + 1,
            name: "x".into(),
            state: procwatch::classify(code.chars().next().unwrap_or('?')),
        })
        .collect();
    let snapshot = Snapshot::from_records(records);

    assert_eq!(
        snapshot.state_counts,
        vec![
            (ProcessState::Running, 1),
            (ProcessState::Sleeping, 2),
            (ProcessState::Zombie, 1),
        ]
    );
    assert_counts_consistent(&snapshot);
}

#[test]
fn test_non_numeric_entries_are_filtered() {
    let dir = tempdir().expect("Failed to create temp dir");
    fake_process(dir.path(), 1, "init", "S");
    fake_process(dir.path(), 77, "worker", "D");
    for name in ["self", "thread-self", "acpi", "net", "1x"] {
        fs::create_dir_all(dir.path().join(name)).expect("Failed to create dir");
        fs::write(dir.path().join(name).join("stat"), "1 (fake) R").expect("write failed");
    }
    fs::write(dir.path().join("uptime"), "1.0 1.0").expect("write failed");

    let snapshot = engine(dir.path()).snapshot();
    let mut pids: Vec<u32> = snapshot.records.iter().map(|r| r.pid).collect();
    pids.sort_unstable();
    assert_eq!(pids, vec![1, 77]);
    assert_eq!(snapshot.count(ProcessState::Waiting), 1);
}

#[test]
fn test_annotated_and_unknown_codes() {
    let dir = tempdir().expect("Failed to create temp dir");
    fake_process(dir.path(), 10, "idle", "I");
    fake_process(dir.path(), 11, "traced", "t");
    fake_process(dir.path(), 12, "stopped", "T");

    let snapshot = engine(dir.path()).snapshot();
    assert_eq!(snapshot.count(ProcessState::Unknown), 2);
    assert_eq!(snapshot.count(ProcessState::Stopped), 1);
    assert_counts_consistent(&snapshot);
}

#[test]
fn test_real_proc_invariants() {
    let snapshot = engine(Path::new("/proc")).snapshot();

    assert!(!snapshot.records.is_empty());
    assert!(snapshot.records.iter().all(|r| r.pid > 0));
    assert_counts_consistent(&snapshot);

    let me = std::process::id();
    assert!(snapshot.records.iter().any(|r| r.pid == me));
}
