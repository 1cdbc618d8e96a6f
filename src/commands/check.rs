//! Check command implementation.
//!
//! Validates system requirements and configuration.

use procwatch::{ExternalListingAdapter, SnapshotEngine};

use crate::config::{validate_effective_config, Config};
use crate::startup_checks::validate_requirements;

/// Validates system requirements and configuration.
pub async fn command_check(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 procwatch - System Check");
    println!("===========================");

    let mut all_ok = true;

    println!("\n⚙️  Checking configuration...");
    match validate_effective_config(config) {
        Ok(_) => println!("   ✅ Configuration is valid"),
        Err(e) => {
            println!("   ❌ Configuration invalid: {}", e);
            all_ok = false;
        }
    }

    println!("\n📁 Checking {}...", config.proc_root().display());
    match validate_requirements(config) {
        Ok(_) => println!("   ✅ Runtime requirements met"),
        Err(e) => {
            println!("   ❌ {}", e);
            all_ok = false;
        }
    }

    let engine = SnapshotEngine::new(config.reader(), config.snapshot_options());
    let snapshot = engine.snapshot();
    if snapshot.is_empty() {
        println!("   ❌ No processes found");
        all_ok = false;
    } else {
        println!("   ✅ Snapshot found {} processes", snapshot.len());
        for (state, count) in &snapshot.state_counts {
            println!("      ├─ {}: {}", state, count);
        }
    }

    if config.listing_enabled() {
        println!("\n📋 Checking external listing...");
        let adapter = ExternalListingAdapter::new(config.listing_options());
        match adapter.run().await {
            Ok(output) => {
                let rows = procwatch::parse_top_output(&output, adapter.options().skip_lines);
                println!("   ✅ Listing returned {} rows", rows.rows.len());
            }
            Err(e) => {
                println!("   ❌ Listing failed: {}", e);
                all_ok = false;
            }
        }
    }

    println!("\n📋 Summary:");
    if all_ok {
        println!("   ✅ All checks passed - system is ready");
        Ok(())
    } else {
        println!("   ❌ Some checks failed - please review warnings");
        std::process::exit(1);
    }
}
