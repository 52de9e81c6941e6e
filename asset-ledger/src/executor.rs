//! Operation executor
//!
//! The execution environment around ledger operations. Each invocation:
//!
//! 1. reads the clock once (the only source of time the operation sees)
//! 2. opens a [`StoreTransaction`] on the backend
//! 3. applies the operation
//! 4. commits every write in one batch on success, discards them on error
//!
//! The executor does no locking of its own. It must be driven by one
//! caller at a time; [`crate::actor`] provides that for async callers.

use crate::{
    metrics::Metrics,
    operation::Operation,
    store::{Backend, StoreTransaction},
    Result,
};
use std::time::Instant;

/// Source of invocation timestamps (UTC seconds since the Unix epoch)
pub trait Clock: Send + Sync {
    /// Current timestamp
    fn now(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Clock pinned to one instant, for replay and tests
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.0
    }
}

/// Runs operations against a backend, one store transaction each
pub struct Executor<B> {
    backend: B,
    clock: Box<dyn Clock>,
    metrics: Option<Metrics>,
}

impl<B> std::fmt::Debug for Executor<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("backend", &std::any::type_name::<B>())
            .field("metrics", &self.metrics.is_some())
            .finish_non_exhaustive()
    }
}

impl<B: Backend> Executor<B> {
    /// Executor using the wall clock and no metrics
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            clock: Box::new(SystemClock),
            metrics: None,
        }
    }

    /// Replace the clock
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Record operation metrics
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Underlying backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Parse and execute a named invocation
    pub fn invoke(&self, name: &str, args: Vec<String>) -> Result<Vec<u8>> {
        let operation = Operation::parse(name, args).map_err(|e| {
            tracing::warn!(operation = %name, error = %e, "Invocation rejected");
            e
        })?;
        self.execute(&operation)
    }

    /// Execute one operation as an atomic unit
    pub fn execute(&self, operation: &Operation) -> Result<Vec<u8>> {
        let started = Instant::now();
        let timestamp = self.clock.now();

        let result = self.run(operation, timestamp);
        let elapsed = started.elapsed();

        match &result {
            Ok(payload) => tracing::debug!(
                operation = operation.name(),
                payload_bytes = payload.len(),
                elapsed_us = elapsed.as_micros() as u64,
                "Operation completed"
            ),
            Err(e) => tracing::warn!(
                operation = operation.name(),
                error = %e,
                "Operation failed, no writes applied"
            ),
        }

        if let Some(metrics) = &self.metrics {
            let outcome = match &result {
                Ok(_) => "ok",
                Err(e) => e.kind(),
            };
            metrics.record_operation(operation.name(), outcome, elapsed);
            if result.is_ok() && matches!(operation, Operation::Transfer(_)) {
                metrics.record_transfer();
            }
        }

        result
    }

    fn run(&self, operation: &Operation, timestamp: i64) -> Result<Vec<u8>> {
        let mut tx = StoreTransaction::begin(&self.backend);
        let payload = operation.apply(&mut tx, timestamp)?;

        if operation.is_mutating() {
            let writes = tx.commit()?;
            if let Some(metrics) = &self.metrics {
                metrics.record_commit(writes);
            }
            tracing::info!(operation = operation.name(), writes, "Operation committed");
        }

        Ok(payload)
    }
}
