//! Periodic refresh of the shared view.
//!
//! The snapshot and the external listing are refreshed by two independent
//! tasks on their own intervals, so a slow `top` run never delays the
//! process table.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, instrument, warn};

use crate::state::SharedState;

/// Takes a fresh snapshot and stores it.
#[instrument(skip(state))]
pub async fn refresh_snapshot(state: &SharedState) {
    let start = Instant::now();
    let engine = state.engine.clone();

    // Reading /proc is blocking file I/O.
    let snapshot = match tokio::task::spawn_blocking(move || engine.snapshot()).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!("Snapshot task failed: {}", e);
            return;
        }
    };

    let elapsed = start.elapsed().as_secs_f64();
    debug!(
        "Snapshot of {} processes in {:.1}ms",
        snapshot.len(),
        elapsed * 1000.0
    );

    let mut cache = state.cache.write().await;
    cache.snapshot.snapshot = snapshot;
    cache.snapshot.last_updated = Some(Instant::now());
    cache.snapshot.update_duration_seconds = elapsed;
    cache.snapshot.ticks += 1;
}

/// Runs the external listing once and stores the result.
#[instrument(skip(state))]
pub async fn refresh_listing(state: &SharedState) {
    let adapter = match &state.listing {
        Some(adapter) => adapter,
        None => return,
    };

    let start = Instant::now();
    let listing = adapter.list_detailed().await;
    let elapsed = start.elapsed().as_secs_f64();

    if listing.is_placeholder() {
        warn!("Listing refresh produced no data ({:.1}ms)", elapsed * 1000.0);
    } else {
        debug!(
            "Listing of {} rows in {:.1}ms",
            listing.rows.len(),
            elapsed * 1000.0
        );
    }

    let mut cache = state.cache.write().await;
    cache.listing.listing = listing;
    cache.listing.last_updated = Some(Instant::now());
    cache.listing.update_duration_seconds = elapsed;
    cache.listing.ticks += 1;
}

fn ticker(period: Duration) -> tokio::time::Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// Starts the background refresh tasks. They run until the runtime stops.
pub fn spawn_refreshers(state: &SharedState) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::new();

    let snapshot_state = Arc::clone(state);
    let period = state.config.refresh_interval();
    handles.push(tokio::spawn(async move {
        let mut interval = ticker(period);
        loop {
            interval.tick().await;
            refresh_snapshot(&snapshot_state).await;
        }
    }));
    info!("Snapshot refresh every {}ms", period.as_millis());

    if state.listing.is_some() {
        let listing_state = Arc::clone(state);
        let period = state.config.listing_refresh_interval();
        handles.push(tokio::spawn(async move {
            let mut interval = ticker(period);
            loop {
                interval.tick().await;
                refresh_listing(&listing_state).await;
            }
        }));
        info!("Listing refresh every {}ms", period.as_millis());
    } else {
        info!("External listing disabled");
    }

    handles
}
