//! CLI arguments and subcommands for procwatch.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use std::net::IpAddr;
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "procwatch",
    about = "Live process monitor with pause/resume/kill control",
    long_about = "Live process monitor with pause/resume/kill control.\n\n\
                  Periodically enumerates /proc, classifies processes by run state, \
                  shows a detailed `top` listing next to it, and lets an operator \
                  pause, resume or kill processes by PID through a small HTTP dashboard.",
    version,
    propagate_version = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// HTTP listen port
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Bind to specific interface/IP
    #[arg(long)]
    pub bind: Option<IpAddr>,

    /// Log level (overrides the config file; default info)
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,

    /// Root of the process information filesystem
    #[arg(long)]
    pub proc_root: Option<PathBuf>,

    /// Snapshot refresh interval in milliseconds
    #[arg(long)]
    pub refresh_ms: Option<u64>,

    /// Listing refresh interval in milliseconds
    #[arg(long)]
    pub listing_refresh_ms: Option<u64>,

    /// Timeout for one `top` run in milliseconds
    #[arg(long)]
    pub listing_timeout_ms: Option<u64>,

    /// Disable the external `top` listing
    #[arg(long)]
    pub no_listing: bool,

    /// Maximum number of processes to scan
    #[arg(long)]
    pub max_processes: Option<usize>,
}

/// Subcommands for one-shot use
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print one process snapshot with per-state counts
    Snapshot {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print one detailed listing from `top`
    Top {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Forcefully terminate a process (SIGKILL)
    Kill {
        /// Target process id
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        pid: u32,
    },

    /// Write a process status report file
    Report {
        /// Output file path
        #[arg(short = 'o', long, default_value = "process_status.txt")]
        output: PathBuf,

        /// File for the raw `top` output taken with the report
        #[arg(long, default_value = "top_output.txt")]
        top_output: PathBuf,

        /// Skip writing the raw `top` output
        #[arg(long)]
        no_top_output: bool,
    },

    /// Render a bar chart from a previously written report
    Chart {
        /// Report file path
        #[arg(default_value = "process_status.txt")]
        input: PathBuf,
    },

    /// Generate configuration files
    Config {
        /// Output file path
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,

        /// Include comments and examples
        #[arg(long)]
        commented: bool,
    },

    /// Validate configuration and system requirements
    Check,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_verifies() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_kill() {
        let args = Args::try_parse_from(["procwatch", "kill", "1234"]).expect("parse failed");
        assert!(matches!(args.command, Some(Commands::Kill { pid: 1234 })));
    }

    #[test]
    fn test_kill_rejects_zero_and_text() {
        assert!(Args::try_parse_from(["procwatch", "kill", "0"]).is_err());
        assert!(Args::try_parse_from(["procwatch", "kill", "abc"]).is_err());
    }

    #[test]
    fn test_parse_report_defaults() {
        let args = Args::try_parse_from(["procwatch", "report"]).expect("parse failed");
        match args.command {
            Some(Commands::Report {
                output,
                top_output,
                no_top_output,
            }) => {
                assert_eq!(output, PathBuf::from("process_status.txt"));
                assert_eq!(top_output, PathBuf::from("top_output.txt"));
                assert!(!no_top_output);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_server_flags() {
        let args = Args::try_parse_from([
            "procwatch",
            "--port",
            "9000",
            "--refresh-ms",
            "500",
            "--no-listing",
        ])
        .expect("parse failed");
        assert!(args.command.is_none());
        assert_eq!(args.port, Some(9000));
        assert_eq!(args.refresh_ms, Some(500));
        assert!(args.no_listing);
    }
}
