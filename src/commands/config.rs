//! Config command implementation.
//!
//! Generates configuration files in various formats.

use std::fs;
use std::path::PathBuf;

use crate::cli::ConfigFormat;
use crate::config::{render_config, Config};

/// Generates configuration files.
pub fn command_config(
    output: Option<PathBuf>,
    format: ConfigFormat,
    commented: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let output = output.unwrap_or_else(|| PathBuf::from("procwatch.yaml"));

    let is_yaml = matches!(format, ConfigFormat::Yaml);
    let mut content = render_config(&config, format)?;
    if commented && is_yaml {
        content = add_config_comments(content);
    }

    if output.to_string_lossy() == "-" {
        print!("{}", content);
    } else {
        fs::write(&output, content)?;
        println!("✅ Configuration written to: {}", output.display());
    }

    Ok(())
}

/// Adds comments to YAML configuration.
fn add_config_comments(yaml: String) -> String {
    let comments = r#"# procwatch Configuration
# ========================
#
# Server Configuration
# --------------------
# bind: "127.0.0.1"            # Bind IP
# port: 9230                   # HTTP port
#
# Snapshot Collection
# -------------------
# proc_root: "/proc"           # Process information filesystem
# refresh_ms: 1000             # Snapshot refresh interval (min 100)
# skip_unreadable: true        # Skip processes that exit mid-scan
# max_processes: null          # Maximum processes per snapshot
#
# External Listing
# ----------------
# enable_listing: true         # Run `top` for the detailed table
# listing_command: "top"       # Listing utility
# listing_args: ["-n", "1", "-b"]
# listing_refresh_ms: 1000     # Listing refresh interval (min 100)
# listing_timeout_ms: 5000     # Kill the utility after this long
# listing_skip_lines: 7        # Banner lines before the task rows
#
# Logging
# -------
# log_level: "info"            # off, error, warn, info, debug, trace
"#;

    format!("{comments}\n{yaml}")
}
