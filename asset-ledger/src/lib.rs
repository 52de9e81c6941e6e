//! Asset Ledger
//!
//! Deterministic asset-transfer engine over an ordered key-value store.
//!
//! # Architecture
//!
//! - **Store Adapter**: get/put/range-scan over RocksDB or memory, with a
//!   write-buffering transaction per operation
//! - **Account Registry**: custody accounts and their asset holdings
//! - **Transaction Log**: append-only records keyed by a persisted counter
//! - **Transfer Engine**: balance checks and holding updates
//! - **Query Layer**: lazy prefix scans over accounts and transactions
//! - **Message Store**: auxiliary records with status updates
//! - **Single Writer**: one actor task runs operations to completion
//!
//! # Invariants
//!
//! - Asset conservation: a transfer moves an amount, never creates it
//! - Deterministic replay: same operations + same clock → same store
//! - Append-only: transactions never modified or deleted
//! - All-or-nothing: a failed operation leaves no writes behind

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod types;
pub mod keys;
pub mod store;
pub mod registry;
pub mod txlog;
pub mod engine;
pub mod query;
pub mod message;
pub mod operation;
pub mod executor;
pub mod error;
pub mod actor;
pub mod ledger;
pub mod config;
pub mod metrics;

// Re-exports
pub use error::{Error, Result};
pub use types::{Account, Asset, KeyedAccount, Message, Transaction};
pub use store::{Backend, MemoryStore, RocksStore, StateStore, StoreTransaction};
pub use engine::TransferRequest;
pub use query::TransactionFilter;
pub use operation::Operation;
pub use executor::{Clock, Executor, FixedClock, SystemClock};
pub use ledger::Ledger;
pub use config::Config;
