//! Latest snapshot and listing shared with the HTTP handlers.
//!
//! The two halves are refreshed by independent tasks, so each carries its
//! own timing metadata.

use procwatch::{ExternalListing, Snapshot};
use std::time::Instant;

/// Most recent snapshot plus refresh bookkeeping.
#[derive(Clone, Default)]
pub struct SnapshotSlot {
    pub snapshot: Snapshot,
    pub last_updated: Option<Instant>,
    pub update_duration_seconds: f64,
    pub ticks: u64,
}

/// Most recent external listing plus refresh bookkeeping.
#[derive(Clone, Default)]
pub struct ListingSlot {
    pub listing: ExternalListing,
    pub last_updated: Option<Instant>,
    pub update_duration_seconds: f64,
    pub ticks: u64,
}

/// Everything the dashboard renders.
#[derive(Clone, Default)]
pub struct ViewCache {
    pub snapshot: SnapshotSlot,
    pub listing: ListingSlot,
}
