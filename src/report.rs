//! Offline process status report.
//!
//! A report lists every process of a snapshot followed by each state's share
//! in percent. [`parse_state_shares`] reads the share lines back so a report
//! can be charted later without access to the live system.
//!
//! ```text
//! Process Status and Names:
//! PID 1: systemd (Sleeping)
//! PID 200: cargo (Running)
//! Sleeping 50.000%
//! Running 50.000%
//! ```

use std::fmt::Write as FmtWrite;
use std::fs;
use std::io;
use std::path::Path;

use crate::process::{ProcessState, Snapshot};

/// First line of every report.
pub const REPORT_HEADER: &str = "Process Status and Names:";

/// Default report file name.
pub const DEFAULT_REPORT_FILE: &str = "process_status.txt";

/// First line of the raw listing file written next to a report.
pub const TOP_OUTPUT_HEADER: &str = "Real-time Process Information (Top Output):";

/// Default raw listing file name.
pub const DEFAULT_TOP_OUTPUT_FILE: &str = "top_output.txt";

/// Width of a 100% bar in [`render_bars`].
const BAR_WIDTH: usize = 50;

/// Errors reading or writing report files.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to access report {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("{0} is not a process status report (missing header)")]
    MissingHeader(String),
}

/// Share of one state, as read from a report.
#[derive(Debug, Clone, PartialEq)]
pub struct StateShare {
    pub state: String,
    pub percent: f64,
}

/// Renders a snapshot as report text.
pub fn render_report(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    writeln!(out, "{REPORT_HEADER}").ok();
    for record in &snapshot.records {
        writeln!(out, "PID {}: {} ({})", record.pid, record.name, record.state).ok();
    }
    for (state, percent) in snapshot.state_percentages() {
        writeln!(out, "{} {:.3}%", state, percent).ok();
    }
    out
}

/// Writes a snapshot report to `path`.
pub fn write_report(snapshot: &Snapshot, path: &Path) -> Result<(), ReportError> {
    fs::write(path, render_report(snapshot)).map_err(|source| ReportError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Renders raw listing output under [`TOP_OUTPUT_HEADER`].
pub fn render_top_output(raw: &str) -> String {
    let mut out = String::with_capacity(TOP_OUTPUT_HEADER.len() + raw.len() + 2);
    out.push_str(TOP_OUTPUT_HEADER);
    out.push('\n');
    out.push_str(raw);
    if !raw.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Writes raw listing output to `path`.
pub fn write_top_output(raw: &str, path: &Path) -> Result<(), ReportError> {
    fs::write(path, render_top_output(raw)).map_err(|source| ReportError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Extracts state shares from report text.
///
/// Only lines after the header consisting of exactly a name and a
/// percentage are used; process lines never match because they have more
/// than two tokens.
pub fn parse_state_shares(content: &str) -> Option<Vec<StateShare>> {
    let mut lines = content.lines();
    lines.by_ref().find(|l| l.trim() == REPORT_HEADER)?;

    let mut shares: Vec<StateShare> = Vec::new();
    for line in lines {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 2 {
            continue;
        }
        let percent = match parts[1].strip_suffix('%').and_then(|p| p.parse::<f64>().ok()) {
            Some(v) => v,
            None => continue,
        };
        // A repeated state keeps its last value.
        match shares.iter_mut().find(|s| s.state == parts[0]) {
            Some(existing) => existing.percent = percent,
            None => shares.push(StateShare {
                state: parts[0].to_string(),
                percent,
            }),
        }
    }
    Some(shares)
}

/// Reads a report file and extracts its state shares.
pub fn read_report(path: &Path) -> Result<Vec<StateShare>, ReportError> {
    let content = fs::read_to_string(path).map_err(|source| ReportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_state_shares(&content).ok_or_else(|| ReportError::MissingHeader(path.display().to_string()))
}

/// Renders labelled horizontal bars, one per entry.
pub fn render_bars<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = (&'a str, f64, String)>,
{
    let entries: Vec<(&str, f64, String)> = entries.into_iter().collect();
    let label_width = entries.iter().map(|(l, _, _)| l.len()).max().unwrap_or(0);

    let mut out = String::new();
    for (label, percent, suffix) in entries {
        let len = ((percent.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
        writeln!(
            out,
            "{:<width$} | {:<bar$} {}",
            label,
            "#".repeat(len),
            suffix,
            width = label_width,
            bar = BAR_WIDTH
        )
        .ok();
    }
    out
}

/// Bar chart of a snapshot's state counts, in first-seen order.
pub fn render_snapshot_chart(snapshot: &Snapshot) -> String {
    let total = snapshot.len().max(1) as f64;
    render_bars(snapshot.state_counts.iter().map(|(state, count)| {
        (
            state.name(),
            *count as f64 * 100.0 / total,
            format!("{}", count),
        )
    }))
}

/// Bar chart of shares read from a report.
pub fn render_share_chart(shares: &[StateShare]) -> String {
    render_bars(
        shares
            .iter()
            .map(|s| (s.state.as_str(), s.percent, format!("{:.1}%", s.percent))),
    )
}

/// Whether a share names a state this tool knows about.
pub fn is_known_state(share: &StateShare) -> bool {
    ProcessState::from_name(&share.state).is_some()
}
