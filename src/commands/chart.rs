//! Chart command implementation.
//!
//! Renders the state shares of a previously written report.

use std::path::Path;

use procwatch::report::{is_known_state, read_report, render_share_chart};

/// Prints a bar chart of the shares found in `input`.
pub fn command_chart(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let shares = read_report(input)?;
    if shares.is_empty() {
        return Err(format!("{} contains no state shares", input.display()).into());
    }

    println!("Process State Distribution ({})", input.display());
    println!();
    print!("{}", render_share_chart(&shares));

    let unknown: Vec<&str> = shares
        .iter()
        .filter(|s| !is_known_state(s))
        .map(|s| s.state.as_str())
        .collect();
    if !unknown.is_empty() {
        println!();
        println!("⚠️  Unrecognized states: {}", unknown.join(", "));
    }
    Ok(())
}
