//! Metrics collection for observability
//!
//! This module provides Prometheus metrics for monitoring the ledger.
//!
//! # Metrics
//!
//! - `ledger_operations_total{operation, outcome}` - Invocations by result
//! - `ledger_operation_duration_seconds{operation}` - Execution latency
//! - `ledger_transfers_total` - Successful transfers
//! - `ledger_committed_writes_total` - Keys written by committed operations

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::Duration;

/// Metrics collector
///
/// Metrics are registered on a private registry so several ledgers can
/// live in one process.
#[derive(Clone)]
pub struct Metrics {
    /// Operations by name and outcome ("ok" or an error kind)
    pub operations_total: IntCounterVec,

    /// Operation duration histogram
    pub operation_duration: HistogramVec,

    /// Successful transfers
    pub transfers_total: IntCounter,

    /// Keys written by committed operations
    pub committed_writes: IntCounter,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let operations_total = IntCounterVec::new(
            Opts::new("ledger_operations_total", "Ledger operations by outcome"),
            &["operation", "outcome"],
        )?;
        registry.register(Box::new(operations_total.clone()))?;

        let operation_duration = HistogramVec::new(
            HistogramOpts::new(
                "ledger_operation_duration_seconds",
                "Histogram of operation latencies",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.010, 0.050, 0.100, 0.500, 1.0]),
            &["operation"],
        )?;
        registry.register(Box::new(operation_duration.clone()))?;

        let transfers_total =
            IntCounter::new("ledger_transfers_total", "Total number of successful transfers")?;
        registry.register(Box::new(transfers_total.clone()))?;

        let committed_writes = IntCounter::new(
            "ledger_committed_writes_total",
            "Keys written by committed operations",
        )?;
        registry.register(Box::new(committed_writes.clone()))?;

        Ok(Self {
            operations_total,
            operation_duration,
            transfers_total,
            committed_writes,
            registry,
        })
    }

    /// Record one finished operation
    pub fn record_operation(&self, operation: &str, outcome: &str, elapsed: Duration) {
        self.operations_total
            .with_label_values(&[operation, outcome])
            .inc();
        self.operation_duration
            .with_label_values(&[operation])
            .observe(elapsed.as_secs_f64());
    }

    /// Record a successful transfer
    pub fn record_transfer(&self) {
        self.transfers_total.inc();
    }

    /// Record keys written by a commit
    pub fn record_commit(&self, writes: usize) {
        self.committed_writes.inc_by(writes as u64);
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Render all metrics in the Prometheus text format
    pub fn encode(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("transfers_total", &self.transfers_total.get())
            .finish_non_exhaustive()
    }
}
