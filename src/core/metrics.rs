//! Pipeline metrics for observability
//!
//! Counters for monitoring pipeline health: accepted records, delivered
//! lines, drops from queue overflow or degraded sinks, and sink write errors.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for pipeline observability.
///
/// # Example
///
/// ```
/// use dxlog::PipelineMetrics;
///
/// let metrics = PipelineMetrics::new();
/// metrics.record_accepted();
/// metrics.record_dropped();
/// assert_eq!(metrics.accepted_count(), 1);
/// assert_eq!(metrics.dropped_count(), 1);
/// ```
#[derive(Debug)]
pub struct PipelineMetrics {
    /// Records that passed the level gate and were enqueued
    accepted_count: AtomicU64,

    /// Lines actually written by sink workers
    written_count: AtomicU64,

    /// Lines dropped due to queue overflow or a degraded sink
    dropped_count: AtomicU64,

    /// Write failures reported by sinks
    sink_error_count: AtomicU64,
}

impl PipelineMetrics {
    /// Create a new metrics instance with all counters at zero.
    pub const fn new() -> Self {
        Self {
            accepted_count: AtomicU64::new(0),
            written_count: AtomicU64::new(0),
            dropped_count: AtomicU64::new(0),
            sink_error_count: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn accepted_count(&self) -> u64 {
        self.accepted_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn written_count(&self) -> u64 {
        self.written_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sink_error_count(&self) -> u64 {
        self.sink_error_count.load(Ordering::Relaxed)
    }

    /// Record an accepted (non-gated) log call.
    #[inline]
    pub fn record_accepted(&self) -> u64 {
        self.accepted_count.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a line written by a sink worker.
    #[inline]
    pub fn record_written(&self) -> u64 {
        self.written_count.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a dropped line. Returns the previous count.
    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.dropped_count.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a sink write failure.
    #[inline]
    pub fn record_sink_error(&self) -> u64 {
        self.sink_error_count.fetch_add(1, Ordering::Relaxed)
    }

    /// Dropped lines as a percentage of all lines headed to sinks.
    ///
    /// Returns 0.0 if nothing has been enqueued yet.
    pub fn drop_rate(&self) -> f64 {
        let dropped = self.dropped_count() as f64;
        let total = self.written_count() as f64 + dropped;
        if total == 0.0 {
            0.0
        } else {
            (dropped / total) * 100.0
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.accepted_count.store(0, Ordering::Relaxed);
        self.written_count.store(0, Ordering::Relaxed);
        self.dropped_count.store(0, Ordering::Relaxed);
        self.sink_error_count.store(0, Ordering::Relaxed);
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for PipelineMetrics {
    /// Snapshot of the current counter values.
    fn clone(&self) -> Self {
        Self {
            accepted_count: AtomicU64::new(self.accepted_count()),
            written_count: AtomicU64::new(self.written_count()),
            dropped_count: AtomicU64::new(self.dropped_count()),
            sink_error_count: AtomicU64::new(self.sink_error_count()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = PipelineMetrics::new();
        assert_eq!(metrics.accepted_count(), 0);
        assert_eq!(metrics.written_count(), 0);
        assert_eq!(metrics.dropped_count(), 0);
        assert_eq!(metrics.sink_error_count(), 0);
    }

    #[test]
    fn test_metrics_counters() {
        let metrics = PipelineMetrics::new();
        assert_eq!(metrics.record_dropped(), 0); // returns previous value
        metrics.record_dropped();
        metrics.record_accepted();
        metrics.record_written();
        metrics.record_sink_error();

        assert_eq!(metrics.dropped_count(), 2);
        assert_eq!(metrics.accepted_count(), 1);
        assert_eq!(metrics.written_count(), 1);
        assert_eq!(metrics.sink_error_count(), 1);
    }

    #[test]
    fn test_drop_rate() {
        let metrics = PipelineMetrics::new();
        assert_eq!(metrics.drop_rate(), 0.0);

        for _ in 0..90 {
            metrics.record_written();
        }
        for _ in 0..10 {
            metrics.record_dropped();
        }
        let rate = metrics.drop_rate();
        assert!((9.9..=10.1).contains(&rate), "drop rate was {}", rate);
    }

    #[test]
    fn test_metrics_reset() {
        let metrics = PipelineMetrics::new();
        metrics.record_accepted();
        metrics.record_dropped();
        metrics.reset();
        assert_eq!(metrics.accepted_count(), 0);
        assert_eq!(metrics.dropped_count(), 0);
    }

    #[test]
    fn test_metrics_clone_is_snapshot() {
        let metrics = PipelineMetrics::new();
        metrics.record_accepted();
        let snapshot = metrics.clone();
        metrics.record_accepted();
        assert_eq!(metrics.accepted_count(), 2);
        assert_eq!(snapshot.accepted_count(), 1);
    }
}
