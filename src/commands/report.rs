//! Report command implementation.
//!
//! Writes a process status report for later charting and, next to it, the
//! raw `top` output of the same moment.

use std::path::Path;

use chrono::Local;
use procwatch::report::{write_report, write_top_output};
use procwatch::{ExternalListingAdapter, SnapshotEngine};
use tracing::warn;

use crate::config::Config;

/// Takes one snapshot and writes it as a report file.
///
/// With `top_output` set and the listing enabled, the raw listing is written
/// there too. A failing listing command leaves its error message in the file
/// instead of failing the report.
pub async fn command_report(
    output: &Path,
    top_output: Option<&Path>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = SnapshotEngine::new(config.reader(), config.snapshot_options());
    let snapshot = engine.snapshot();

    write_report(&snapshot, output)?;

    println!(
        "✅ Report of {} processes written to: {} ({})",
        snapshot.len(),
        output.display(),
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    for (state, percent) in snapshot.state_percentages() {
        println!("   {:<10} {:>8.3}%", state.name(), percent);
    }

    if let Some(path) = top_output.filter(|_| config.listing_enabled()) {
        let adapter = ExternalListingAdapter::new(config.listing_options());
        let raw = match adapter.run().await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("External listing failed: {}", e);
                format!("Error running {} command: {}\n", adapter.options().command, e)
            }
        };
        write_top_output(&raw, path)?;
        println!("✅ Listing written to: {}", path.display());
    }
    Ok(())
}
