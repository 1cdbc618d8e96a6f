//! Detailed process listing from an external `top` run.
//!
//! This is a second, best-effort data source shown next to the snapshot. It
//! has no relation to the snapshot records or the paused set. Failures never
//! propagate: [`ExternalListingAdapter::list_detailed`] turns them into a
//! single placeholder cell.

use serde::{Deserialize, Serialize};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Column layout of `top -b` task lines.
pub const TOP_COLUMNS: [&str; 12] = [
    "PID", "USER", "PR", "NI", "VIRT", "RES", "SHR", "S", "%CPU", "%MEM", "TIME+", "COMMAND",
];

/// Summary and header lines printed by `top -b` before the task rows.
pub const DEFAULT_SKIP_LINES: usize = 7;

/// Row-oriented table of external listing output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalListing {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ExternalListing {
    fn with_header(rows: Vec<Vec<String>>) -> Self {
        Self {
            header: TOP_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    /// Listing whose only cell carries a failure message.
    pub fn placeholder(message: impl Into<String>) -> Self {
        Self::with_header(vec![vec![message.into()]])
    }

    /// True when this listing is a failure placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.rows.len() == 1 && self.rows[0].len() == 1
    }
}

impl Default for ExternalListing {
    fn default() -> Self {
        Self::with_header(Vec::new())
    }
}

/// Errors running the listing command.
#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    #[error("failed to start {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("timed out after {0} ms")]
    Timeout(u64),

    #[error("{command} exited with {status}")]
    ExitStatus { command: String, status: String },
}

/// How the listing command is run and parsed.
#[derive(Debug, Clone)]
pub struct ListingOptions {
    pub command: String,
    pub args: Vec<String>,
    pub timeout: Duration,
    pub skip_lines: usize,
}

impl Default for ListingOptions {
    fn default() -> Self {
        Self {
            command: "top".to_string(),
            args: vec!["-n".into(), "1".into(), "-b".into()],
            timeout: Duration::from_millis(5000),
            skip_lines: DEFAULT_SKIP_LINES,
        }
    }
}

/// Runs the external listing utility and parses its output.
#[derive(Debug, Clone, Default)]
pub struct ExternalListingAdapter {
    options: ListingOptions,
}

impl ExternalListingAdapter {
    pub fn new(options: ListingOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ListingOptions {
        &self.options
    }

    /// Runs the command once and returns its raw stdout.
    pub async fn run(&self) -> Result<String, ListingError> {
        let opts = &self.options;
        let child = Command::new(&opts.command)
            .args(&opts.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ListingError::Spawn {
                command: opts.command.clone(),
                source,
            })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = match tokio::time::timeout(opts.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|source| ListingError::Spawn {
                command: opts.command.clone(),
                source,
            })?,
            Err(_) => return Err(ListingError::Timeout(opts.timeout.as_millis() as u64)),
        };

        if !output.status.success() {
            return Err(ListingError::ExitStatus {
                command: opts.command.clone(),
                status: output.status.to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Runs the command and parses it, or returns a placeholder listing.
    pub async fn list_detailed(&self) -> ExternalListing {
        match self.run().await {
            Ok(output) => parse_top_output(&output, self.options.skip_lines),
            Err(e) => {
                warn!("External listing failed: {}", e);
                ExternalListing::placeholder(format!("Error running {} command: {}", self.options.command, e))
            }
        }
    }
}

/// Parses `top -b` output into 12-column rows.
///
/// The first `skip_lines` lines are dropped. Blank lines are ignored, tokens
/// past the eleventh are joined into COMMAND, and shorter lines are skipped.
pub fn parse_top_output(output: &str, skip_lines: usize) -> ExternalListing {
    let columns = TOP_COLUMNS.len();
    let mut rows = Vec::new();
    let mut malformed = 0usize;

    for line in output.lines().skip(skip_lines) {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        if tokens.len() < columns {
            malformed += 1;
            continue;
        }
        let mut row: Vec<String> = tokens[..columns - 1].iter().map(|t| t.to_string()).collect();
        row.push(tokens[columns - 1..].join(" "));
        rows.push(row);
    }

    if malformed > 0 {
        debug!("Skipped {} malformed listing lines", malformed);
    }

    ExternalListing::with_header(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BANNER: &str = "\
top - 10:00:00 up 1 day,  2:03,  1 user,  load average: 0.10, 0.20, 0.30
Tasks: 210 total,   1 running, 209 sleeping,   0 stopped,   0 zombie
%Cpu(s):  1.2 us,  0.5 sy,  0.0 ni, 98.1 id,  0.1 wa,  0.0 hi,  0.1 si,  0.0 st
MiB Mem :  15921.3 total,   8123.4 free,   4021.1 used,   3776.8 buff/cache
MiB Swap:   2048.0 total,   2048.0 free,      0.0 used.  11543.2 avail Mem

    PID USER      PR  NI    VIRT    RES    SHR S  %CPU  %MEM     TIME+ COMMAND
";

    #[test]
    fn test_parse_banner_and_rows() {
        let output = format!(
            "{}{}",
            BANNER,
            "      1 root      20   0  167744  12936   8452 S   0.0   0.1   0:03.21 systemd\n\
             1234 alice     20   0   10000   4000   3000 R   6.2   0.0   0:00.01 top\n\
             4321 bob       20   0   22000   5000   1000 S   0.0   0.0   1:02.00 bash\n"
        );
        let listing = parse_top_output(&output, DEFAULT_SKIP_LINES);
        assert_eq!(listing.rows.len(), 3);
        assert!(listing.rows.iter().all(|r| r.len() == 12));
        assert_eq!(listing.rows[1][0], "1234");
        assert_eq!(listing.rows[1][7], "R");
        assert_eq!(listing.rows[2][11], "bash");
        assert_eq!(listing.header, TOP_COLUMNS.to_vec());
    }

    #[test]
    fn test_parse_command_with_spaces() {
        let output = format!(
            "{}{}",
            BANNER, "  77 carol 20 0 1 1 1 S 0.0 0.0 0:00.00 Web Content\n"
        );
        let listing = parse_top_output(&output, DEFAULT_SKIP_LINES);
        assert_eq!(listing.rows.len(), 1);
        assert_eq!(listing.rows[0].len(), 12);
        assert_eq!(listing.rows[0][11], "Web Content");
    }

    #[test]
    fn test_parse_skips_blank_and_short_lines() {
        let output = format!("{}\n\n  1 root 20 0\n", BANNER);
        assert!(parse_top_output(&output, DEFAULT_SKIP_LINES).rows.is_empty());
    }

    #[test]
    fn test_parse_banner_only() {
        assert!(parse_top_output(BANNER, DEFAULT_SKIP_LINES).rows.is_empty());
        assert!(parse_top_output("", DEFAULT_SKIP_LINES).rows.is_empty());
    }

    #[test]
    fn test_placeholder() {
        let listing = ExternalListing::placeholder("Error running top command.");
        assert!(listing.is_placeholder());
        assert_eq!(listing.rows[0][0], "Error running top command.");
        assert!(!ExternalListing::default().is_placeholder());
    }

    #[tokio::test]
    async fn test_missing_command_gives_placeholder() {
        let adapter = ExternalListingAdapter::new(ListingOptions {
            command: "definitely-not-a-real-command-xyz".into(),
            ..ListingOptions::default()
        });
        assert!(matches!(adapter.run().await, Err(ListingError::Spawn { .. })));

        let listing = adapter.list_detailed().await;
        assert!(listing.is_placeholder());
        assert!(listing.rows[0][0].starts_with("Error running definitely-not-a-real-command-xyz command"));
    }

    #[tokio::test]
    async fn test_timeout() {
        let adapter = ExternalListingAdapter::new(ListingOptions {
            command: "sleep".into(),
            args: vec!["5".into()],
            timeout: Duration::from_millis(100),
            skip_lines: 0,
        });
        assert!(matches!(adapter.run().await, Err(ListingError::Timeout(100))));

        let listing = adapter.list_detailed().await;
        assert!(listing.is_placeholder());
        assert_eq!(listing.header, ExternalListing::default().header);
        assert!(listing.rows[0][0].contains("timed out after 100 ms"));
    }

    #[tokio::test]
    async fn test_non_zero_exit() {
        let adapter = ExternalListingAdapter::new(ListingOptions {
            command: "false".into(),
            args: vec![],
            timeout: Duration::from_secs(5),
            skip_lines: 0,
        });
        assert!(matches!(adapter.run().await, Err(ListingError::ExitStatus { .. })));
    }

    #[tokio::test]
    async fn test_run_parses_command_output() {
        let adapter = ExternalListingAdapter::new(ListingOptions {
            command: "printf".into(),
            args: vec!["h1\\nh2\\n9 u 20 0 1 2 3 S 0.0 0.1 0:00.00 init\\n".into()],
            timeout: Duration::from_secs(5),
            skip_lines: 2,
        });
        let listing = adapter.list_detailed().await;
        assert_eq!(listing.rows.len(), 1);
        assert_eq!(listing.rows[0][11], "init");
    }
}
