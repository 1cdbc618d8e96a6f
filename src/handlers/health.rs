//! Health check endpoint handler.
//!
//! This module provides the `/health` endpoint handler that reports whether
//! the refresh tasks are keeping the view current.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::fmt::Write as FmtWrite;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::state::SharedState;

/// Footer text for human-readable HTTP endpoints.
pub const FOOTER_TEXT: &str = concat!("procwatch ", env!("CARGO_PKG_VERSION"));

/// The view counts as stale after this many missed refresh intervals.
const STALE_INTERVALS: u32 = 5;

/// Formats an age for display, `never` when no refresh happened yet.
pub fn format_age(age: Option<Duration>) -> String {
    match age {
        Some(d) => format!("{:.1}s ago", d.as_secs_f64()),
        None => "never".to_string(),
    }
}

/// Formats an uptime as hours, minutes and seconds.
pub fn format_uptime(uptime_secs: u64) -> String {
    let hours = uptime_secs / 3600;
    let minutes = (uptime_secs % 3600) / 60;
    let seconds = uptime_secs % 60;
    format!("{}h {}m {}s", hours, minutes, seconds)
}

/// Handler for the /health endpoint.
#[instrument(skip(state))]
pub async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing /health request");

    let cache = state.cache.read().await;
    let snapshot_age = cache.snapshot.last_updated.map(|t| t.elapsed());
    let listing_age = cache.listing.last_updated.map(|t| t.elapsed());

    let limit = state.config.refresh_interval() * STALE_INTERVALS;
    let fresh = snapshot_age.is_some_and(|age| age <= limit);
    let status = if fresh {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let mut out = String::new();
    writeln!(out, "{}", if fresh { "OK" } else { "Snapshot stale" }).ok();
    writeln!(out).ok();
    writeln!(
        out,
        "Uptime:            {}",
        format_uptime(state.start_time.elapsed().as_secs())
    )
    .ok();
    writeln!(
        out,
        "Snapshot:          {} processes, updated {}, {} ticks, last {:.1}ms",
        cache.snapshot.snapshot.len(),
        format_age(snapshot_age),
        cache.snapshot.ticks,
        cache.snapshot.update_duration_seconds * 1000.0
    )
    .ok();
    if state.listing.is_some() {
        writeln!(
            out,
            "Listing:           {} rows, updated {}, {} ticks, last {:.1}ms",
            cache.listing.listing.rows.len(),
            format_age(listing_age),
            cache.listing.ticks,
            cache.listing.update_duration_seconds * 1000.0
        )
        .ok();
    } else {
        writeln!(out, "Listing:           disabled").ok();
    }
    writeln!(
        out,
        "Paused (tracked):  {}",
        state.controller.paused().len()
    )
    .ok();
    writeln!(out).ok();
    writeln!(out, "{FOOTER_TEXT}").ok();

    debug!("Health check: {}", status);
    (
        status,
        [("Content-Type", "text/plain; charset=utf-8")],
        out,
    )
}
