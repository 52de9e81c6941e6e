//! Actor-based serialization of ledger operations
//!
//! Ledger operations assume serial execution. This module implements the
//! single-writer pattern using Tokio actors:
//! - One task owns the [`Executor`] and runs operations to completion
//! - Callers hold a cloneable [`LedgerHandle`] and await a oneshot reply
//! - The bounded mailbox applies backpressure
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │         Callers (CLI, services, tests)                │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │               LedgerHandle (Clone)                    │
//! │         Sends messages to actor mailbox              │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       │ mpsc::channel (bounded)
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │              LedgerActor (Single Task)                │
//! │     Executor::execute() - one operation at a time     │
//! │                       │                               │
//! │                       ▼                               │
//! │       StoreTransaction::commit() (one batch)          │
//! └───────────────────────────────────────────────────────┘
//! ```

use crate::{executor::Executor, operation::Operation, store::Backend, Error, Result};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Message sent to the ledger actor
#[derive(Debug)]
pub enum LedgerMessage {
    /// Execute one operation
    Execute {
        /// Operation to run
        operation: Operation,
        /// Reply channel for the payload
        response: oneshot::Sender<Result<Vec<u8>>>,
    },

    /// Shutdown actor
    Shutdown,
}

/// Actor that processes ledger messages
pub struct LedgerActor<B> {
    /// Operation executor (owns the backend)
    executor: Executor<B>,

    /// Mailbox for incoming messages
    mailbox: mpsc::Receiver<LedgerMessage>,
}

impl<B> std::fmt::Debug for LedgerActor<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerActor")
            .field("executor", &self.executor)
            .finish_non_exhaustive()
    }
}

impl<B: Backend> LedgerActor<B> {
    /// Create new actor
    pub fn new(executor: Executor<B>, mailbox: mpsc::Receiver<LedgerMessage>) -> Self {
        Self { executor, mailbox }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.mailbox.recv().await {
            match msg {
                LedgerMessage::Execute {
                    operation,
                    response,
                } => {
                    let result = self.executor.execute(&operation);
                    if response.send(result).is_err() {
                        tracing::debug!(
                            operation = operation.name(),
                            "Caller dropped before response"
                        );
                    }
                }
                LedgerMessage::Shutdown => break,
            }
        }

        tracing::info!("Ledger actor stopped");
    }
}

/// Handle for sending messages to the actor
#[derive(Debug, Clone)]
pub struct LedgerHandle {
    sender: mpsc::Sender<LedgerMessage>,
}

impl LedgerHandle {
    /// Create new handle
    pub fn new(sender: mpsc::Sender<LedgerMessage>) -> Self {
        Self { sender }
    }

    /// Execute a typed operation
    pub async fn execute(&self, operation: Operation) -> Result<Vec<u8>> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(LedgerMessage::Execute {
                operation,
                response: tx,
            })
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Parse and execute a named invocation
    pub async fn invoke(&self, name: &str, args: Vec<String>) -> Result<Vec<u8>> {
        let operation = Operation::parse(name, args)?;
        self.execute(operation).await
    }

    /// Shutdown actor
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(LedgerMessage::Shutdown)
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;
        Ok(())
    }
}

/// Spawn the ledger actor
///
/// The returned task finishes once the actor has dropped its executor
/// (and with it the backend).
pub fn spawn_ledger_actor<B: Backend + 'static>(
    executor: Executor<B>,
    mailbox_capacity: usize,
) -> (LedgerHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(mailbox_capacity); // Bounded channel for backpressure
    let actor = LedgerActor::new(executor, rx);

    let task = tokio::spawn(async move {
        actor.run().await;
    });

    (LedgerHandle::new(tx), task)
}
