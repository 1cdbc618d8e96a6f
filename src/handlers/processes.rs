//! Snapshot endpoint handlers.
//!
//! - `/processes`: plain-text process table
//! - `/states`: plain-text bar chart of state counts
//! - `/snapshot`: JSON snapshot
//! - `/paused`: JSON list of pids paused by this server

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use procwatch::report::render_snapshot_chart;
use procwatch::Snapshot;
use std::fmt::Write as FmtWrite;
use tracing::{debug, instrument};

use crate::handlers::health::FOOTER_TEXT;
use crate::state::SharedState;

/// Renders the process table as plain text.
pub fn render_process_table(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    writeln!(out, "{:>8} | {:<20} | {:<10}", "PID", "Name", "Status").ok();
    writeln!(out, "{}", "-".repeat(44)).ok();
    for record in &snapshot.records {
        writeln!(
            out,
            "{:>8} | {:<20} | {:<10}",
            record.pid, record.name, record.state
        )
        .ok();
    }
    writeln!(out).ok();
    writeln!(out, "Total processes: {}", snapshot.len()).ok();
    out
}

/// Handler for the /processes endpoint.
#[instrument(skip(state))]
pub async fn processes_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing /processes request");
    let cache = state.cache.read().await;
    let table = render_process_table(&cache.snapshot.snapshot);
    (
        StatusCode::OK,
        [("Content-Type", "text/plain; charset=utf-8")],
        format!("{table}\n{FOOTER_TEXT}\n"),
    )
}

/// Handler for the /states endpoint.
#[instrument(skip(state))]
pub async fn states_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing /states request");
    let cache = state.cache.read().await;
    let snapshot = &cache.snapshot.snapshot;

    let mut out = String::new();
    writeln!(out, "PROCESS STATUS").ok();
    writeln!(out, "==============").ok();
    writeln!(out).ok();
    out.push_str(&render_snapshot_chart(snapshot));
    writeln!(out).ok();
    writeln!(out, "Total processes: {}", snapshot.len()).ok();
    writeln!(out).ok();
    writeln!(out, "{FOOTER_TEXT}").ok();

    (
        StatusCode::OK,
        [("Content-Type", "text/plain; charset=utf-8")],
        out,
    )
}

/// Handler for the /snapshot endpoint.
#[instrument(skip(state))]
pub async fn snapshot_handler(State(state): State<SharedState>) -> Json<Snapshot> {
    debug!("Processing /snapshot request");
    Json(state.cache.read().await.snapshot.snapshot.clone())
}

/// Handler for the /paused endpoint.
#[instrument(skip(state))]
pub async fn paused_handler(State(state): State<SharedState>) -> Json<Vec<u32>> {
    debug!("Processing /paused request");
    Json(state.controller.paused())
}
