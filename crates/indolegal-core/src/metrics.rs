//! Atomic counters for playback and feed activity.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. when a page is torn down).
//!
//! Each [`crate::page::Page`] owns its own `Metrics`, so independent pages
//! (and tests) never share counts.

use std::sync::atomic::{AtomicU64, Ordering};

/// Lightweight atomic counters; no allocations, no locking.
#[derive(Debug)]
pub struct Metrics {
    runs_started: AtomicU64,
    runs_completed: AtomicU64,
    runs_ignored: AtomicU64,
    data_not_found: AtomicU64,
    feed_entries: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            runs_started: AtomicU64::new(0),
            runs_completed: AtomicU64::new(0),
            runs_ignored: AtomicU64::new(0),
            data_not_found: AtomicU64::new(0),
            feed_entries: AtomicU64::new(0),
        }
    }

    pub fn inc_runs_started(&self) {
        self.runs_started.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "runs_started", "counter incremented");
    }

    pub fn inc_runs_completed(&self) {
        self.runs_completed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "runs_completed", "counter incremented");
    }

    /// A run trigger arrived while a run was in flight.
    pub fn inc_runs_ignored(&self) {
        self.runs_ignored.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "runs_ignored", "counter incremented");
    }

    pub fn inc_data_not_found(&self) {
        self.data_not_found.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "data_not_found", "counter incremented");
    }

    pub fn inc_feed_entries(&self) {
        self.feed_entries.fetch_add(1, Ordering::Relaxed);
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            runs_started = self.runs_started(),
            runs_completed = self.runs_completed(),
            runs_ignored = self.runs_ignored(),
            data_not_found = self.data_not_found(),
            feed_entries = self.feed_entries(),
        );
    }

    pub fn runs_started(&self) -> u64 {
        self.runs_started.load(Ordering::Relaxed)
    }

    pub fn runs_completed(&self) -> u64 {
        self.runs_completed.load(Ordering::Relaxed)
    }

    pub fn runs_ignored(&self) -> u64 {
        self.runs_ignored.load(Ordering::Relaxed)
    }

    pub fn data_not_found(&self) -> u64 {
        self.data_not_found.load(Ordering::Relaxed)
    }

    pub fn feed_entries(&self) -> u64 {
        self.feed_entries.load(Ordering::Relaxed)
    }
}
