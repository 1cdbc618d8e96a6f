//! Startup requirement validation for procwatch.
//!
//! This module validates that the proc filesystem is readable and that the
//! listing utility can be found before the server starts.

use nix::unistd::geteuid;
use std::env;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::config::Config;

/// Validate all runtime requirements
pub fn validate_requirements(config: &Config) -> Result<(), ValidationError> {
    info!("🔍 Validating runtime requirements...");

    check_user_privileges();
    check_proc_access(&config.proc_root())?;

    if config.listing_enabled() {
        let command = config.listing_options().command;
        if find_in_path(&command).is_none() {
            warn!("⚠️  Listing command '{}' not found in PATH", command);
            return Err(ValidationError::ListingCommandMissing(command));
        }
        info!("✅ Listing command '{}' available", command);
    }

    info!("✅ All runtime requirements validated");
    Ok(())
}

/// Signals to other users' processes need root or CAP_KILL.
fn check_user_privileges() {
    if !geteuid().is_root() {
        warn!("⚠️  Not running as root - only own processes can be paused or killed");
    } else {
        info!("✅ Running as root (uid=0)");
    }
}

/// Check the proc root can be listed and the init process read
fn check_proc_access(root: &Path) -> Result<(), ValidationError> {
    if let Err(e) = fs::read_dir(root) {
        return Err(ValidationError::ProcUnreadable(format!(
            "{}: {}",
            root.display(),
            e
        )));
    }

    match fs::read_to_string(root.join("1").join("stat")) {
        Ok(_) => info!("✅ {} access: process stat readable", root.display()),
        Err(e) => warn!(
            "⚠️  Could not read {}/1/stat: {} - states may show as Unknown",
            root.display(),
            e
        ),
    }
    Ok(())
}

/// Locates an executable by name, honouring explicit paths.
pub fn find_in_path(command: &str) -> Option<std::path::PathBuf> {
    if command.contains('/') {
        let p = Path::new(command);
        return p.is_file().then(|| p.to_path_buf());
    }
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(command))
        .find(|candidate| candidate.is_file())
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Cannot list process information filesystem {0}")]
    ProcUnreadable(String),

    #[error("Listing command '{0}' not found")]
    ListingCommandMissing(String),
}
