//! Main ledger orchestration layer
//!
//! This module ties together storage, the executor and the actor into a
//! typed async API over the ledger operations.
//!
//! # Example
//!
//! ```no_run
//! use asset_ledger::{Config, Ledger};
//! use rust_decimal::Decimal;
//!
//! #[tokio::main]
//! async fn main() -> asset_ledger::Result<()> {
//!     let ledger = Ledger::open(Config::default()).await?;
//!
//!     ledger.init_ledger().await?;
//!     ledger.transfer("CLIENT0", "CLIENT1", "A1", Decimal::new(1000, 0)).await?;
//!
//!     ledger.shutdown().await
//! }
//! ```

use crate::{
    actor::{spawn_ledger_actor, LedgerHandle},
    config::BackendKind,
    engine::TransferRequest,
    executor::{Clock, Executor, SystemClock},
    message::NewMessage,
    metrics::Metrics,
    operation::Operation,
    query::TransactionFilter,
    store::{Backend, MemoryStore, RocksStore},
    types::{Account, KeyedAccount, Message, Transaction},
    Config, Error, Result,
};
use rust_decimal::Decimal;
use tokio::task::JoinHandle;

/// Main ledger interface
#[derive(Debug)]
pub struct Ledger {
    /// Actor handle for operations
    handle: LedgerHandle,

    /// Actor task, owns the backend until it finishes
    task: JoinHandle<()>,

    /// Operation metrics
    metrics: Metrics,

    /// Configuration
    config: Config,
}

impl Ledger {
    /// Open ledger with configuration, using the wall clock
    pub async fn open(config: Config) -> Result<Self> {
        Self::open_with_clock(config, SystemClock).await
    }

    /// Open ledger with configuration and an explicit clock
    pub async fn open_with_clock(config: Config, clock: impl Clock + 'static) -> Result<Self> {
        config.validate()?;

        let metrics = Metrics::new()
            .map_err(|e| Error::Config(format!("Failed to register metrics: {}", e)))?;

        let (handle, task) = match config.backend {
            BackendKind::RocksDb => {
                let store = RocksStore::open(&config)?;
                Self::spawn(store, clock, metrics.clone(), config.mailbox_capacity)
            }
            BackendKind::Memory => {
                Self::spawn(MemoryStore::new(), clock, metrics.clone(), config.mailbox_capacity)
            }
        };

        tracing::info!(
            service = %config.service_name,
            version = %config.service_version,
            backend = ?config.backend,
            "Ledger opened"
        );

        Ok(Self {
            handle,
            task,
            metrics,
            config,
        })
    }

    fn spawn<B: Backend + 'static>(
        backend: B,
        clock: impl Clock + 'static,
        metrics: Metrics,
        mailbox_capacity: usize,
    ) -> (LedgerHandle, JoinHandle<()>) {
        let executor = Executor::new(backend)
            .with_clock(clock)
            .with_metrics(metrics);
        spawn_ledger_actor(executor, mailbox_capacity)
    }

    /// Cloneable handle for concurrent callers
    pub fn handle(&self) -> LedgerHandle {
        self.handle.clone()
    }

    /// Operation metrics
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Configuration the ledger was opened with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Execute a named invocation with string arguments
    pub async fn invoke(&self, name: &str, args: Vec<String>) -> Result<Vec<u8>> {
        self.handle.invoke(name, args).await
    }

    /// Seed the five demo accounts
    pub async fn init_ledger(&self) -> Result<()> {
        self.handle.execute(Operation::InitLedger).await?;
        Ok(())
    }

    /// Transfer `amount` of `asset_id` from seller to buyer
    pub async fn transfer(
        &self,
        seller_key: &str,
        buyer_key: &str,
        asset_id: &str,
        amount: Decimal,
    ) -> Result<()> {
        let request = TransferRequest {
            seller_key: seller_key.to_string(),
            buyer_key: buyer_key.to_string(),
            asset_id: asset_id.to_string(),
            amount,
        };
        self.handle.execute(Operation::Transfer(request)).await?;
        Ok(())
    }

    /// All accounts, in key order
    pub async fn list_accounts(&self) -> Result<Vec<KeyedAccount>> {
        let payload = self.handle.execute(Operation::ListAccounts).await?;
        Ok(serde_json::from_slice(&payload)?)
    }

    /// Transactions passing `filter`, in creation order
    pub async fn list_transactions(&self, filter: TransactionFilter) -> Result<Vec<Transaction>> {
        let payload = self
            .handle
            .execute(Operation::ListTransactions(filter))
            .await?;
        Ok(serde_json::from_slice(&payload)?)
    }

    /// One account by key
    pub async fn get_account(&self, key: &str) -> Result<Account> {
        let payload = self
            .handle
            .execute(Operation::GetAccount {
                key: key.to_string(),
            })
            .await?;
        Ok(serde_json::from_slice(&payload)?)
    }

    /// Create or overwrite a message
    pub async fn set_message(&self, message: NewMessage) -> Result<()> {
        self.handle.execute(Operation::SetMessage(message)).await?;
        Ok(())
    }

    /// One message by id
    pub async fn get_message(&self, id: &str) -> Result<Message> {
        let payload = self
            .handle
            .execute(Operation::GetMessage { id: id.to_string() })
            .await?;
        Ok(serde_json::from_slice(&payload)?)
    }

    /// Replace a message's status
    pub async fn update_message_status(&self, id: &str, status: &str) -> Result<()> {
        self.handle
            .execute(Operation::UpdateMessageStatus {
                id: id.to_string(),
                status: status.to_string(),
            })
            .await?;
        Ok(())
    }

    /// Shutdown ledger, returning once the backend is closed
    pub async fn shutdown(self) -> Result<()> {
        self.handle.shutdown().await?;
        self.task
            .await
            .map_err(|e| Error::Concurrency(format!("Ledger actor failed: {}", e)))
    }
}
