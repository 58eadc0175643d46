//! Search engine metrics tracking.
//!
//! Cheap atomic counters shared by the rebuild cycle, the scheduler and the
//! query evaluator.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Metrics tracker shared across the search engine components.
#[derive(Debug, Clone)]
pub struct SearchMetrics {
    rebuilds_total: Arc<AtomicU64>,
    rebuild_failures_total: Arc<AtomicU64>,
    rebuilds_rejected_busy: Arc<AtomicU64>,
    searches_total: Arc<AtomicU64>,
    query_fallbacks_total: Arc<AtomicU64>,
}

/// Point-in-time copy of all counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub rebuilds_total: u64,
    pub rebuild_failures_total: u64,
    pub rebuilds_rejected_busy: u64,
    pub searches_total: u64,
    pub query_fallbacks_total: u64,
}

impl SearchMetrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self {
            rebuilds_total: Arc::new(AtomicU64::new(0)),
            rebuild_failures_total: Arc::new(AtomicU64::new(0)),
            rebuilds_rejected_busy: Arc::new(AtomicU64::new(0)),
            searches_total: Arc::new(AtomicU64::new(0)),
            query_fallbacks_total: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Track a finished rebuild attempt.
    pub fn track_rebuild(&self, duration_ms: u128, documents: usize, success: bool) {
        self.rebuilds_total.fetch_add(1, Ordering::Relaxed);

        if !success {
            self.rebuild_failures_total.fetch_add(1, Ordering::Relaxed);
        }

        tracing::debug!(
            duration_ms = duration_ms,
            documents = documents,
            success = success,
            "Index rebuild attempt completed"
        );
    }

    /// Track a rebuild that was turned away because the writer was busy.
    pub fn track_rebuild_rejected(&self) {
        self.rebuilds_rejected_busy.fetch_add(1, Ordering::Relaxed);
        tracing::trace!("Rebuild rejected, writer busy");
    }

    /// Track a search query.
    pub fn track_search_query(&self, duration_ms: u128, result_count: usize) {
        self.searches_total.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(
            duration_ms = duration_ms,
            result_count = result_count,
            "Search query completed"
        );
    }

    /// Track a search whose exact clause fell back to literal terms.
    pub fn track_query_fallback(&self) {
        self.query_fallbacks_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn rebuilds_total(&self) -> u64 {
        self.rebuilds_total.load(Ordering::Relaxed)
    }

    pub fn rebuild_failures_total(&self) -> u64 {
        self.rebuild_failures_total.load(Ordering::Relaxed)
    }

    pub fn rebuilds_rejected_busy(&self) -> u64 {
        self.rebuilds_rejected_busy.load(Ordering::Relaxed)
    }

    pub fn searches_total(&self) -> u64 {
        self.searches_total.load(Ordering::Relaxed)
    }

    pub fn query_fallbacks_total(&self) -> u64 {
        self.query_fallbacks_total.load(Ordering::Relaxed)
    }

    /// Get the rebuild failure rate (0.0 to 1.0).
    pub fn rebuild_failure_rate(&self) -> f64 {
        let failures = self.rebuild_failures_total() as f64;
        let total = self.rebuilds_total() as f64;

        if total == 0.0 {
            0.0
        } else {
            failures / total
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            rebuilds_total: self.rebuilds_total(),
            rebuild_failures_total: self.rebuild_failures_total(),
            rebuilds_rejected_busy: self.rebuilds_rejected_busy(),
            searches_total: self.searches_total(),
            query_fallbacks_total: self.query_fallbacks_total(),
        }
    }

    /// Print a summary of all metrics.
    pub fn summary(&self) -> String {
        format!(
            "Metrics Summary:\n\
             Rebuilds: {}\n\
             Rebuild Failures: {} ({:.2}% failure rate)\n\
             Rebuilds Rejected (busy): {}\n\
             Search Queries: {}\n\
             Query Parse Fallbacks: {}",
            self.rebuilds_total(),
            self.rebuild_failures_total(),
            self.rebuild_failure_rate() * 100.0,
            self.rebuilds_rejected_busy(),
            self.searches_total(),
            self.query_fallbacks_total(),
        )
    }
}

impl Default for SearchMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A timer for tracking operation duration.
pub struct Timer {
    start: Instant,
    operation: String,
}

impl Timer {
    /// Start a new timer for the given operation.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            operation: operation.into(),
        }
    }

    /// Milliseconds since the timer started.
    pub fn elapsed_ms(&self) -> u128 {
        self.start.elapsed().as_millis()
    }

    /// Finish the timer and return the elapsed time in milliseconds.
    pub fn finish(self) -> u128 {
        let duration_ms = self.elapsed_ms();

        tracing::debug!(
            operation = %self.operation,
            duration_ms = duration_ms,
            "Operation completed"
        );

        duration_ms
    }

    /// Finish the timer with a specific status.
    pub fn finish_with_status(self, success: bool) -> u128 {
        let duration_ms = self.elapsed_ms();

        if success {
            tracing::debug!(
                operation = %self.operation,
                duration_ms = duration_ms,
                "Operation succeeded"
            );
        } else {
            tracing::warn!(
                operation = %self.operation,
                duration_ms = duration_ms,
                "Operation failed"
            );
        }

        duration_ms
    }
}
