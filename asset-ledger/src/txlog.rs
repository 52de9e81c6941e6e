//! Append-only transaction log
//!
//! Ids come from a persisted counter at [`keys::TRANSACTION_SEQUENCE_KEY`]
//! rather than a scan of the existing range, so allocation is O(1) and the
//! log has no capacity limit. The counter write is part of the same store
//! transaction as the record itself; an aborted operation leaves the counter
//! where it was.

use crate::{keys, store::StateStore, types::Transaction, Error, Result};

/// Last allocated sequence number (0 when the log is empty)
pub fn current_sequence<S: StateStore + ?Sized>(store: &S) -> Result<u64> {
    match store.get(keys::TRANSACTION_SEQUENCE_KEY)? {
        None => Ok(0),
        Some(bytes) => std::str::from_utf8(&bytes)
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .ok_or_else(|| {
                Error::Storage(format!(
                    "Corrupt transaction sequence at {}",
                    keys::TRANSACTION_SEQUENCE_KEY
                ))
            }),
    }
}

/// Allocate the next transaction id
///
/// Strictly greater than every id allocated before it.
pub fn next_transaction_id<S: StateStore + ?Sized>(store: &mut S) -> Result<String> {
    let next = current_sequence(store)?
        .checked_add(1)
        .ok_or_else(|| Error::InvariantViolation("Transaction sequence exhausted".to_string()))?;
    store.put(keys::TRANSACTION_SEQUENCE_KEY, next.to_string().into_bytes())?;
    Ok(keys::transaction_key(next))
}

/// Write a new transaction record
///
/// Refuses to overwrite an existing record.
pub fn append<S: StateStore + ?Sized>(store: &mut S, transaction: &Transaction) -> Result<()> {
    if !transaction.id.starts_with(keys::TRANSACTION_PREFIX) {
        return Err(Error::InvariantViolation(format!(
            "Transaction id {} outside the transaction key range",
            transaction.id
        )));
    }
    if store.get(&transaction.id)?.is_some() {
        return Err(Error::InvariantViolation(format!(
            "Transaction {} already recorded",
            transaction.id
        )));
    }
    store.put(&transaction.id, serde_json::to_vec(transaction)?)?;

    tracing::debug!(tx_id = %transaction.id, "Transaction appended");
    Ok(())
}

/// Read one transaction by id
pub fn get_transaction<S: StateStore + ?Sized>(store: &S, id: &str) -> Result<Transaction> {
    let bytes = store
        .get(id)?
        .ok_or_else(|| Error::NotFound(format!("Transaction {}", id)))?;
    Ok(serde_json::from_slice(&bytes)?)
}
