//! Progress-callback trait for per-event and per-page split events.
//!
//! Inject an [`Arc<dyn SplitProgressCallback>`] via
//! [`crate::config::SplitConfigBuilder::progress_callback`] to observe a run
//! as it happens. The library itself never prints; a terminal progress bar,
//! a job-queue heartbeat or a test counter all plug in here.
//!
//! # Example
//!
//! ```rust
//! use pdf_eventsplit::{SplitConfig, SplitProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct PaintedCounter {
//!     painted: AtomicUsize,
//! }
//!
//! impl SplitProgressCallback for PaintedCounter {
//!     fn on_page_painted(&self, _event_num: usize, _page_num: usize) {
//!         self.painted.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//!
//! let counter = Arc::new(PaintedCounter { painted: AtomicUsize::new(0) });
//! let config = SplitConfig::builder()
//!     .progress_callback(counter as Arc<dyn SplitProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the split orchestrator as it walks events and pages.
///
/// Calls arrive strictly in order from a single thread, but the trait is
/// `Send + Sync` so a config can be moved into [`crate::split_async`].
/// All methods default to no-ops.
pub trait SplitProgressCallback: Send + Sync {
    /// Called once after the source loaded, before the first event.
    ///
    /// # Arguments
    /// * `total_events` — number of events in the run
    /// * `source_pages` — page count of the source document
    fn on_run_start(&self, total_events: usize, source_pages: usize) {
        let _ = (total_events, source_pages);
    }

    /// Called when an event's output is about to be opened.
    ///
    /// # Arguments
    /// * `event_num`       — 1-indexed position in the event list
    /// * `total_events`    — number of events in the run
    /// * `output`          — destination file
    /// * `requested_pages` — width of the event's page range
    fn on_event_start(
        &self,
        event_num: usize,
        total_events: usize,
        output: &Path,
        requested_pages: usize,
    ) {
        let _ = (event_num, total_events, output, requested_pages);
    }

    /// Called after a source page has been painted onto the event's output.
    fn on_page_painted(&self, event_num: usize, page_num: usize) {
        let _ = (event_num, page_num);
    }

    /// Called when a source page was skipped (missing, or failed to render
    /// or paint). Pages beyond the end of the source are only counted in
    /// [`crate::output::EventReport::missing_pages`], not reported one by one.
    fn on_page_skipped(&self, event_num: usize, page_num: usize, reason: &str) {
        let _ = (event_num, page_num, reason);
    }

    /// Called once the event's output has been finalised (or failed to be).
    ///
    /// # Arguments
    /// * `painted` — pages written to the output
    /// * `error`   — event-level failure, if the output could not be produced
    fn on_event_complete(&self, event_num: usize, painted: usize, error: Option<&str>) {
        let _ = (event_num, painted, error);
    }

    /// Called once after every event has been processed.
    fn on_run_complete(&self, total_events: usize, painted_pages: usize) {
        let _ = (total_events, painted_pages);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl SplitProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::SplitConfig`].
pub type ProgressCallback = Arc<dyn SplitProgressCallback>;
