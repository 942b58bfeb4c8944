//! Per-handler metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for a single handler in the dispatch registry
#[derive(Debug, Default)]
pub struct HandlerMetrics {
    /// Total upserts delivered successfully
    upsert_count: AtomicU64,
    /// Total deletes delivered successfully
    delete_count: AtomicU64,
    /// Total failed deliveries
    failure_count: AtomicU64,
}

impl HandlerMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get total upsert count
    pub fn upsert_count(&self) -> u64 {
        self.upsert_count.load(Ordering::Relaxed)
    }

    /// Increment upsert count
    pub fn inc_upsert_count(&self) {
        self.upsert_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total delete count
    pub fn delete_count(&self) -> u64 {
        self.delete_count.load(Ordering::Relaxed)
    }

    /// Increment delete count
    pub fn inc_delete_count(&self) {
        self.delete_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get failure count
    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    /// Increment failure count
    pub fn inc_failure_count(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            upsert_count: self.upsert_count(),
            delete_count: self.delete_count(),
            failure_count: self.failure_count(),
        }
    }
}

/// Snapshot of handler metrics (for reporting)
#[derive(Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    pub upsert_count: u64,
    pub delete_count: u64,
    pub failure_count: u64,
}
