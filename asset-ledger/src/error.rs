//! Error types for the asset ledger

use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
///
/// Every operation reports at most one of these, synchronously, and leaves
/// the store untouched when it does.
#[derive(Error, Debug)]
pub enum Error {
    /// Wrong argument count or format, unparsable amount, unknown operation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing account or message key
    #[error("Not found: {0}")]
    NotFound(String),

    /// Asset not held, or held amount below the requested amount
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    /// Store adapter read/write failure (RocksDB, corrupt keys)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Record (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invariant violation (rewriting an immutable record, etc.)
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Concurrency error (actor mailbox closed, etc.)
    #[error("Concurrency error: {0}")]
    Concurrency(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Short machine-readable kind, used as a metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation",
            Error::NotFound(_) => "not_found",
            Error::InsufficientFunds(_) => "insufficient_funds",
            Error::Storage(_) => "storage",
            Error::Serialization(_) => "serialization",
            Error::InvariantViolation(_) => "invariant",
            Error::Concurrency(_) => "concurrency",
            Error::Config(_) => "config",
            Error::Io(_) => "io",
        }
    }
}

impl From<rocksdb::Error> for Error {
    fn from(err: rocksdb::Error) -> Self {
        Error::Storage(err.to_string())
    }
}
