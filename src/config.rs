//! Configuration management for procwatch.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.

use crate::cli::{Args, ConfigFormat};
use procwatch::listing::DEFAULT_SKIP_LINES;
use procwatch::{ListingOptions, ProcessReader, SnapshotOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

// Default configuration constants
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 9230;
pub const DEFAULT_PROC_ROOT: &str = "/proc";
pub const DEFAULT_REFRESH_MS: u64 = 1000;
pub const DEFAULT_LISTING_TIMEOUT_MS: u64 = 5000;

/// Intervals shorter than this would keep a core busy re-reading /proc.
const MIN_REFRESH_MS: u64 = 100;

/// Effective configuration; every field is optional so files may be partial.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    pub port: Option<u16>,
    pub bind: Option<String>,

    // Snapshot collection
    #[serde(alias = "proc-root")]
    pub proc_root: Option<PathBuf>,
    #[serde(alias = "refresh-ms")]
    pub refresh_ms: Option<u64>,
    #[serde(alias = "skip-unreadable")]
    pub skip_unreadable: Option<bool>,
    #[serde(alias = "max-processes")]
    pub max_processes: Option<usize>,

    // External listing
    #[serde(alias = "enable-listing")]
    pub enable_listing: Option<bool>,
    #[serde(alias = "listing-command")]
    pub listing_command: Option<String>,
    #[serde(alias = "listing-args")]
    pub listing_args: Option<Vec<String>>,
    #[serde(alias = "listing-refresh-ms")]
    pub listing_refresh_ms: Option<u64>,
    #[serde(alias = "listing-timeout-ms")]
    pub listing_timeout_ms: Option<u64>,
    #[serde(alias = "listing-skip-lines")]
    pub listing_skip_lines: Option<usize>,

    // Logging
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let listing = ListingOptions::default();
        Self {
            bind: Some(DEFAULT_BIND_ADDR.to_string()),
            port: Some(DEFAULT_PORT),
            proc_root: Some(PathBuf::from(DEFAULT_PROC_ROOT)),
            refresh_ms: Some(DEFAULT_REFRESH_MS),
            skip_unreadable: Some(true),
            max_processes: None,
            enable_listing: Some(true),
            listing_command: Some(listing.command),
            listing_args: Some(listing.args),
            listing_refresh_ms: Some(DEFAULT_REFRESH_MS),
            listing_timeout_ms: Some(DEFAULT_LISTING_TIMEOUT_MS),
            listing_skip_lines: Some(DEFAULT_SKIP_LINES),
            log_level: Some("info".into()),
        }
    }
}

impl Config {
    pub fn proc_root(&self) -> PathBuf {
        self.proc_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROC_ROOT))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_ms.unwrap_or(DEFAULT_REFRESH_MS))
    }

    pub fn listing_refresh_interval(&self) -> Duration {
        Duration::from_millis(self.listing_refresh_ms.unwrap_or(DEFAULT_REFRESH_MS))
    }

    pub fn listing_enabled(&self) -> bool {
        self.enable_listing.unwrap_or(true)
    }

    pub fn reader(&self) -> ProcessReader {
        ProcessReader::new(self.proc_root())
    }

    pub fn snapshot_options(&self) -> SnapshotOptions {
        SnapshotOptions {
            skip_unreadable: self.skip_unreadable.unwrap_or(true),
            max_processes: self.max_processes,
        }
    }

    pub fn listing_options(&self) -> ListingOptions {
        let defaults = ListingOptions::default();
        ListingOptions {
            command: self.listing_command.clone().unwrap_or(defaults.command),
            args: self.listing_args.clone().unwrap_or(defaults.args),
            timeout: Duration::from_millis(
                self.listing_timeout_ms.unwrap_or(DEFAULT_LISTING_TIMEOUT_MS),
            ),
            skip_lines: self.listing_skip_lines.unwrap_or(defaults.skip_lines),
        }
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    for (name, value) in [
        ("refresh_ms", cfg.refresh_ms),
        ("listing_refresh_ms", cfg.listing_refresh_ms),
    ] {
        if let Some(ms) = value {
            if ms < MIN_REFRESH_MS {
                return Err(format!("{} must be at least {} (got {})", name, MIN_REFRESH_MS, ms).into());
            }
        }
    }

    if cfg.listing_timeout_ms == Some(0) {
        return Err("listing_timeout_ms must be greater than 0".into());
    }

    if cfg.max_processes == Some(0) {
        return Err("max_processes must be greater than 0 when set".into());
    }

    if cfg.listing_enabled() {
        let command = cfg.listing_command.as_deref().unwrap_or("top");
        if command.trim().is_empty() {
            return Err("listing_command must not be empty when the listing is enabled".into());
        }
    }

    if let Some(bind) = cfg.bind.as_deref() {
        if bind.parse::<std::net::IpAddr>().is_err() {
            return Err(format!("Invalid bind address '{}'", bind).into());
        }
    }

    let proc_root = cfg.proc_root();
    if !proc_root.is_dir() {
        return Err(format!("proc_root {} is not a directory", proc_root.display()).into());
    }

    Ok(())
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(bind_ip) = args.bind {
        config.bind = Some(bind_ip.to_string());
    }
    if let Some(cli_port) = args.port {
        config.port = Some(cli_port);
    }

    if let Some(root) = &args.proc_root {
        config.proc_root = Some(root.clone());
    }
    if let Some(ms) = args.refresh_ms {
        config.refresh_ms = Some(ms);
    }
    if args.max_processes.is_some() {
        config.max_processes = args.max_processes;
    }

    if let Some(ms) = args.listing_refresh_ms {
        config.listing_refresh_ms = Some(ms);
    }
    if let Some(ms) = args.listing_timeout_ms {
        config.listing_timeout_ms = Some(ms);
    }
    if args.no_listing {
        config.enable_listing = Some(false);
    }

    Ok(config)
}

/// Configuration loading with multiple format support.
///
/// Without an explicit path the first existing default location is used;
/// if none exists the built-in defaults apply.
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let defaults = [
                "/etc/procwatch/procwatch.yaml",
                "/etc/procwatch/procwatch.yml",
                "/etc/procwatch/procwatch.json",
                "./procwatch.yaml",
                "./procwatch.yml",
                "./procwatch.json",
            ];
            match defaults.iter().find(|p| Path::new(p).exists()) {
                Some(p) => PathBuf::from(p),
                None => return Ok(Config::default()),
            }
        }
    };

    let content = fs::read_to_string(&path)
        .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
    let config = parse_config(&content, &path)?;
    info!("Loaded configuration from: {}", path.display());
    Ok(config)
}

/// Parses config content, choosing the format from the file extension.
/// Fields missing from the file take their default values.
pub fn parse_config(content: &str, path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    let parsed: Config = match path.extension().and_then(|s| s.to_str()) {
        Some("json") => serde_json::from_str(content)?,
        Some("toml") => toml::from_str(content)?,
        _ => serde_yaml::from_str(content)?,
    };
    Ok(merge_defaults(parsed))
}

fn merge_defaults(parsed: Config) -> Config {
    let d = Config::default();
    Config {
        port: parsed.port.or(d.port),
        bind: parsed.bind.or(d.bind),
        proc_root: parsed.proc_root.or(d.proc_root),
        refresh_ms: parsed.refresh_ms.or(d.refresh_ms),
        skip_unreadable: parsed.skip_unreadable.or(d.skip_unreadable),
        max_processes: parsed.max_processes.or(d.max_processes),
        enable_listing: parsed.enable_listing.or(d.enable_listing),
        listing_command: parsed.listing_command.or(d.listing_command),
        listing_args: parsed.listing_args.or(d.listing_args),
        listing_refresh_ms: parsed.listing_refresh_ms.or(d.listing_refresh_ms),
        listing_timeout_ms: parsed.listing_timeout_ms.or(d.listing_timeout_ms),
        listing_skip_lines: parsed.listing_skip_lines.or(d.listing_skip_lines),
        log_level: parsed.log_level.or(d.log_level),
    }
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", render_config(config, format)?);
    Ok(())
}

pub fn render_config(
    config: &Config,
    format: ConfigFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    let output = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = Config::default();
        assert!(validate_effective_config(&cfg).is_ok());
        assert_eq!(cfg.refresh_interval(), Duration::from_millis(1000));
        assert_eq!(cfg.listing_options().args, vec!["-n", "1", "-b"]);
        assert_eq!(cfg.listing_options().skip_lines, 7);
    }

    #[test]
    fn test_validate_rejects_fast_refresh() {
        let mut cfg = Config::default();
        cfg.refresh_ms = Some(10);
        let err = validate_effective_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("refresh_ms"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout_and_bad_bind() {
        let mut cfg = Config::default();
        cfg.listing_timeout_ms = Some(0);
        assert!(validate_effective_config(&cfg).is_err());

        let mut cfg = Config::default();
        cfg.bind = Some("not-an-ip".into());
        assert!(validate_effective_config(&cfg).is_err());
    }

    #[test]
    fn test_validate_rejects_missing_proc_root() {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut cfg = Config::default();
        cfg.proc_root = Some(dir.path().join("missing"));
        assert!(validate_effective_config(&cfg).is_err());
    }

    #[test]
    fn test_parse_partial_yaml() {
        let cfg = parse_config("port: 9999\nlisting-timeout-ms: 250\n", Path::new("x.yaml"))
            .expect("parse failed");
        assert_eq!(cfg.port, Some(9999));
        assert_eq!(cfg.listing_timeout_ms, Some(250));
        assert_eq!(cfg.refresh_ms, Some(DEFAULT_REFRESH_MS));
        assert_eq!(cfg.bind.as_deref(), Some(DEFAULT_BIND_ADDR));
    }

    #[test]
    fn test_parse_json_and_toml() {
        let cfg = parse_config(r#"{"enable_listing": false}"#, Path::new("c.json")).expect("json");
        assert!(!cfg.listing_enabled());

        let cfg = parse_config("refresh_ms = 2000\n", Path::new("c.toml")).expect("toml");
        assert_eq!(cfg.refresh_interval(), Duration::from_millis(2000));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("procwatch.yaml");
        fs::write(&path, "max_processes: 5\n").expect("write failed");
        let cfg = load_config(Some(&path)).expect("load failed");
        assert_eq!(cfg.max_processes, Some(5));
        assert!(load_config(Some(&dir.path().join("nope.yaml"))).is_err());
    }

    #[test]
    fn test_cli_overrides_file() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("procwatch.yaml");
        fs::write(&path, "port: 1111\nrefresh_ms: 3000\n").expect("write failed");

        let args = Args::try_parse_from([
            "procwatch",
            "-c",
            path.to_str().expect("utf8 path"),
            "--port",
            "2222",
            "--no-listing",
        ])
        .expect("parse failed");
        let cfg = resolve_config(&args).expect("resolve failed");
        assert_eq!(cfg.port, Some(2222));
        assert_eq!(cfg.refresh_ms, Some(3000));
        assert!(!cfg.listing_enabled());
    }

    #[test]
    fn test_render_config_formats() {
        let cfg = Config::default();
        for format in [ConfigFormat::Yaml, ConfigFormat::Json] {
            let text = render_config(&cfg, format).expect("render failed");
            assert!(text.contains("refresh_ms"));
        }
    }
}
