//! Application state management for the server.
//!
//! This module defines the shared application state that is passed
//! to HTTP handlers and used by the background refresh tasks.

use procwatch::{ExternalListingAdapter, LifecycleController, SnapshotEngine};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

use crate::cache::ViewCache;
use crate::config::Config;

/// Type alias for shared application state.
pub type SharedState = Arc<AppState>;

/// Global application state shared across requests and background tasks.
pub struct AppState {
    pub config: Arc<Config>,
    pub engine: SnapshotEngine,
    /// `None` when the listing is disabled.
    pub listing: Option<ExternalListingAdapter>,
    /// Sole owner of the paused-pid set.
    pub controller: Arc<LifecycleController>,
    pub cache: RwLock<ViewCache>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: Config, controller: Arc<LifecycleController>) -> Self {
        let engine = SnapshotEngine::new(config.reader(), config.snapshot_options());
        let listing = config
            .listing_enabled()
            .then(|| ExternalListingAdapter::new(config.listing_options()));
        Self {
            config: Arc::new(config),
            engine,
            listing,
            controller,
            cache: RwLock::new(ViewCache::default()),
            start_time: Instant::now(),
        }
    }
}
