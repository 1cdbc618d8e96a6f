//! Snapshot command implementation.
//!
//! Takes one snapshot and prints the process table and state chart.

use std::time::Instant;

use procwatch::report::render_snapshot_chart;
use procwatch::SnapshotEngine;

use crate::config::Config;
use crate::handlers::processes::render_process_table;

/// Prints one snapshot as a table or as JSON.
pub fn command_snapshot(json: bool, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let engine = SnapshotEngine::new(config.reader(), config.snapshot_options());

    let start = Instant::now();
    let snapshot = engine.snapshot();
    let duration = start.elapsed();

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    print!("{}", render_process_table(&snapshot));
    println!();
    print!("{}", render_snapshot_chart(&snapshot));
    println!();
    println!(
        "Scan duration: {:.2}ms",
        duration.as_secs_f64() * 1000.0
    );
    Ok(())
}
