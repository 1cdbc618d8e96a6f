//! Root endpoint handler for the dashboard.
//!
//! This module provides the `/` endpoint handler that renders the process
//! table, the state bar chart, the external listing and the action forms.

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse},
};
use procwatch::{ExternalListing, Snapshot};
use serde::Deserialize;
use std::fmt::Write as FmtWrite;
use tracing::{debug, instrument};

use crate::handlers::health::{format_uptime, FOOTER_TEXT};
use crate::state::SharedState;

/// Bar colours, cycled in state order.
const BAR_COLORS: [&str; 6] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b",
];

/// Query parameters for the dashboard.
#[derive(Deserialize, Debug)]
pub struct RootQuery {
    /// Outcome message of the last form action.
    pub msg: Option<String>,
}

/// Escapes text for inclusion in HTML.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_chart(snapshot: &Snapshot) -> String {
    let max = snapshot
        .state_counts
        .iter()
        .map(|(_, c)| *c)
        .max()
        .unwrap_or(0)
        .max(1);
    let mut out = String::new();
    for (idx, (state, count)) in snapshot.state_counts.iter().enumerate() {
        let height = (*count as f64 / max as f64 * 100.0).round();
        writeln!(
            out,
            r#"<div class="bar-col"><div class="bar" style="height:{height}%;background:{color}"></div><div class="bar-label">{state}<br>({count})</div></div>"#,
            height = height,
            color = BAR_COLORS[idx % BAR_COLORS.len()],
            state = state,
            count = count
        )
        .ok();
    }
    out
}

fn render_process_rows(snapshot: &Snapshot, paused: &[u32]) -> String {
    let mut out = String::new();
    for record in &snapshot.records {
        let class = if paused.binary_search(&record.pid).is_ok() {
            r#" class="paused""#
        } else {
            ""
        };
        writeln!(
            out,
            "<tr{}><td>{}</td><td>{}</td><td>{}</td></tr>",
            class,
            record.pid,
            escape_html(&record.name),
            record.state
        )
        .ok();
    }
    out
}

fn render_listing(listing: &ExternalListing) -> String {
    let mut out = String::new();
    out.push_str("<table><thead><tr>");
    for column in &listing.header {
        write!(out, "<th>{}</th>", escape_html(column)).ok();
    }
    out.push_str("</tr></thead><tbody>\n");
    for row in &listing.rows {
        out.push_str("<tr>");
        if row.len() == 1 {
            write!(
                out,
                r#"<td colspan="{}">{}</td>"#,
                listing.header.len(),
                escape_html(&row[0])
            )
            .ok();
        } else {
            for cell in row {
                write!(out, "<td>{}</td>", escape_html(cell)).ok();
            }
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody></table>");
    out
}

/// Handler for the root `/` endpoint.
#[instrument(skip(state))]
pub async fn root_handler(
    State(state): State<SharedState>,
    Query(query): Query<RootQuery>,
) -> impl IntoResponse {
    debug!("Processing / request");

    let refresh_secs = state.config.refresh_interval().as_secs().max(1);
    let uptime = format_uptime(state.start_time.elapsed().as_secs());
    let paused = state.controller.paused();

    let cache = state.cache.read().await;
    let snapshot = &cache.snapshot.snapshot;

    let message = query
        .msg
        .as_deref()
        .map(|m| format!(r#"<div class="msg">{}</div>"#, escape_html(m)))
        .unwrap_or_default();
    let paused_list = if paused.is_empty() {
        "none".to_string()
    } else {
        paused
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let listing_section = if state.listing.is_some() {
        format!(
            "<h2>Process Attributes (top)</h2>\n{}",
            render_listing(&cache.listing.listing)
        )
    } else {
        String::new()
    };

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta http-equiv="refresh" content="{refresh};url=/">
    <title>procwatch</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; padding: 20px; background: #f5f5f5; }}
        .container {{ max-width: 1200px; margin: 0 auto; background: white; padding: 30px; border-radius: 8px; box-shadow: 0 2px 8px rgba(0,0,0,0.1); }}
        h1 {{ color: #333; border-bottom: 3px solid #007bff; padding-bottom: 10px; }}
        .row {{ display: flex; gap: 30px; flex-wrap: wrap; }}
        .scroll {{ flex: 1; max-height: 420px; overflow-y: auto; }}
        table {{ border-collapse: collapse; width: 100%; font-size: 0.9em; }}
        th, td {{ border-bottom: 1px solid #ddd; padding: 4px 8px; text-align: left; }}
        th {{ background: #e9ecef; position: sticky; top: 0; }}
        tr.paused td {{ background: #fff3cd; }}
        .chart {{ flex: 1; display: flex; align-items: flex-end; gap: 12px; height: 320px; padding: 10px; border: 1px solid #ddd; }}
        .bar-col {{ flex: 1; display: flex; flex-direction: column; justify-content: flex-end; height: 100%; text-align: center; }}
        .bar {{ width: 100%; min-height: 2px; }}
        .bar-label {{ font-size: 0.85em; margin-top: 4px; }}
        .actions form {{ display: inline-block; margin-right: 20px; }}
        .msg {{ background: #e9ecef; padding: 10px; border-radius: 4px; margin: 10px 0; }}
        .footer {{ margin-top: 30px; color: #666; font-size: 0.9em; text-align: center; }}
    </style>
</head>
<body>
<div class="container">
    <h1>Process Status</h1>
    <p>Processes: {total} &middot; Paused by procwatch: {paused} &middot; Uptime: {uptime}</p>
    {message}
    <div class="actions">
        <form method="post" action="/actions"><input type="hidden" name="action" value="kill"><label>Enter PID to Kill: <input name="pid" size="8"></label> <button>Kill Process</button></form>
        <form method="post" action="/actions"><input type="hidden" name="action" value="pause"><label>Enter PID to Pause: <input name="pid" size="8"></label> <button>Pause Process</button></form>
        <form method="post" action="/actions"><input type="hidden" name="action" value="resume"><label>Enter PID to Resume: <input name="pid" size="8"></label> <button>Resume Process</button></form>
    </div>
    <div class="row">
        <div class="scroll">
            <table><thead><tr><th>PID</th><th>Name</th><th>Status</th></tr></thead>
            <tbody>
{rows}            </tbody></table>
        </div>
        <div class="chart">
{chart}        </div>
    </div>
    {listing}
    <div class="footer"><p>{footer}</p></div>
</div>
</body>
</html>"#,
        refresh = refresh_secs,
        total = snapshot.len(),
        paused = paused_list,
        uptime = uptime,
        message = message,
        rows = render_process_rows(snapshot, &paused),
        chart = render_chart(snapshot),
        listing = listing_section,
        footer = FOOTER_TEXT
    );

    Html(html)
}
