//! procwatch library
//!
//! Process snapshot and lifecycle-control engine for Linux. It enumerates
//! processes from `/proc`, classifies them by run state, runs `top` for a
//! detailed resource listing, and pauses, resumes or kills processes by pid
//! while tracking which ones it has paused.
//!
//! # Usage
//!
//! ```rust,no_run
//! use procwatch::{LifecycleController, ProcessReader, SnapshotEngine, SnapshotOptions};
//!
//! let engine = SnapshotEngine::new(ProcessReader::new("/proc"), SnapshotOptions::default());
//! let snapshot = engine.snapshot();
//! for (state, count) in &snapshot.state_counts {
//!     println!("{}: {}", state, count);
//! }
//!
//! let controller = LifecycleController::with_kernel_signals();
//! println!("{}", controller.resume(42)); // "Process 42 is not paused"
//! ```

pub mod lifecycle;
pub mod listing;
pub mod process;
pub mod report;

// Re-export main types for convenience
pub use lifecycle::{
    ControlOutcome, KernelSignals, LifecycleController, LifecycleSignal, SignalDelivery,
    SignalError,
};
pub use listing::{
    parse_top_output, ExternalListing, ExternalListingAdapter, ListingError, ListingOptions,
    TOP_COLUMNS,
};
pub use process::{
    classify, ProcessReader, ProcessRecord, ProcessState, Snapshot, SnapshotEngine,
    SnapshotOptions,
};
