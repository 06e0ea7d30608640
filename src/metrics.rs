//! Poller metrics.
//!
//! Provides atomic counters for monitoring the poll loop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Metrics for the event poller.
#[derive(Debug)]
pub struct PollerMetrics {
    /// Total poll cycles.
    poll_cycles: AtomicU64,

    /// Total events processed.
    events_processed: AtomicU64,

    /// Full pages fetched.
    full_pages: AtomicU64,

    /// Poll cycles that returned no events.
    empty_polls: AtomicU64,

    /// Fetch failures.
    fetch_errors: AtomicU64,

    /// Cursor persistence failures.
    persist_errors: AtomicU64,

    /// Per-event handler failures.
    handler_errors: AtomicU64,

    /// Start time for rate calculation.
    start_time: Instant,
}

impl Default for PollerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PollerMetrics {
    /// Creates a new metrics instance.
    #[must_use]
    pub fn new() -> Self {
        Self {
            poll_cycles: AtomicU64::new(0),
            events_processed: AtomicU64::new(0),
            full_pages: AtomicU64::new(0),
            empty_polls: AtomicU64::new(0),
            fetch_errors: AtomicU64::new(0),
            persist_errors: AtomicU64::new(0),
            handler_errors: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Records a poll cycle.
    pub fn record_poll(&self) {
        self.poll_cycles.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a fetched page.
    pub fn record_page(&self, events: u64, full: bool) {
        self.events_processed.fetch_add(events, Ordering::Relaxed);
        if full {
            self.full_pages.fetch_add(1, Ordering::Relaxed);
        }
        if events == 0 {
            self.empty_polls.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Records a fetch failure.
    pub fn record_fetch_error(&self) {
        self.fetch_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a cursor persistence failure.
    pub fn record_persist_error(&self) {
        self.persist_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a handler failure.
    pub fn record_handler_error(&self) {
        self.handler_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns total poll cycles.
    #[must_use]
    pub fn poll_cycles(&self) -> u64 {
        self.poll_cycles.load(Ordering::Relaxed)
    }

    /// Returns total events processed.
    #[must_use]
    pub fn events_processed(&self) -> u64 {
        self.events_processed.load(Ordering::Relaxed)
    }

    /// Returns full pages fetched.
    #[must_use]
    pub fn full_pages(&self) -> u64 {
        self.full_pages.load(Ordering::Relaxed)
    }

    /// Returns poll cycles that found no events.
    #[must_use]
    pub fn empty_polls(&self) -> u64 {
        self.empty_polls.load(Ordering::Relaxed)
    }

    /// Returns fetch failures.
    #[must_use]
    pub fn fetch_errors(&self) -> u64 {
        self.fetch_errors.load(Ordering::Relaxed)
    }

    /// Returns cursor persistence failures.
    #[must_use]
    pub fn persist_errors(&self) -> u64 {
        self.persist_errors.load(Ordering::Relaxed)
    }

    /// Returns handler failures.
    #[must_use]
    pub fn handler_errors(&self) -> u64 {
        self.handler_errors.load(Ordering::Relaxed)
    }

    /// Returns the uptime.
    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Returns a snapshot of all counters.
    #[must_use]
    pub fn snapshot(&self) -> PollerMetricsSnapshot {
        PollerMetricsSnapshot {
            poll_cycles: self.poll_cycles(),
            events_processed: self.events_processed(),
            full_pages: self.full_pages(),
            empty_polls: self.empty_polls(),
            fetch_errors: self.fetch_errors(),
            persist_errors: self.persist_errors(),
            handler_errors: self.handler_errors(),
            uptime: self.uptime(),
        }
    }
}

/// A point-in-time snapshot of poller metrics.
#[derive(Debug, Clone)]
pub struct PollerMetricsSnapshot {
    /// Total poll cycles.
    pub poll_cycles: u64,
    /// Total events processed.
    pub events_processed: u64,
    /// Full pages fetched.
    pub full_pages: u64,
    /// Empty poll cycles.
    pub empty_polls: u64,
    /// Fetch failures.
    pub fetch_errors: u64,
    /// Persistence failures.
    pub persist_errors: u64,
    /// Handler failures.
    pub handler_errors: u64,
    /// Uptime.
    pub uptime: Duration,
}
