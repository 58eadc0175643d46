//! Observability module for monitoring and metrics.
//!
//! Counters for rebuild and search activity plus an operation timer; the
//! structured log lines they emit go through `tracing`.

pub mod metrics;

pub use metrics::{MetricsSnapshot, SearchMetrics, Timer};
