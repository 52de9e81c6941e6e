//! Read-only queries over accounts and the transaction log
//!
//! Each call performs a fresh prefix range scan and decodes records lazily,
//! in key order. Nothing is cached.

use crate::{
    keys,
    store::StateStore,
    types::{Account, Transaction},
    Result,
};

/// Which transactions a log query yields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionFilter {
    /// Every transaction
    All,
    /// Transactions where the account key is seller or buyer
    Participant(String),
}

impl TransactionFilter {
    /// `"ALL"` selects everything, anything else is an account key
    pub fn from_arg(arg: String) -> Self {
        if arg == "ALL" {
            TransactionFilter::All
        } else {
            TransactionFilter::Participant(arg)
        }
    }

    /// Whether a transaction passes the filter
    pub fn matches(&self, transaction: &Transaction) -> bool {
        match self {
            TransactionFilter::All => true,
            TransactionFilter::Participant(key) => transaction.involves(key),
        }
    }
}

/// All accounts as `(key, account)`, in key order
pub fn list_accounts<'s, S: StateStore + ?Sized>(
    store: &'s S,
) -> Result<impl Iterator<Item = Result<(String, Account)>> + 's> {
    let (start, end) = keys::prefix_range(keys::ACCOUNT_PREFIX)?;
    let scan = store.range_scan(&start, &end)?;

    Ok(scan.map(|item| -> Result<(String, Account)> {
        let (key, bytes) = item?;
        let account: Account = serde_json::from_slice(&bytes)?;
        Ok((key, account))
    }))
}

/// Transactions passing `filter`, in creation order
pub fn list_transactions<'s, S: StateStore + ?Sized>(
    store: &'s S,
    filter: TransactionFilter,
) -> Result<impl Iterator<Item = Result<Transaction>> + 's> {
    let (start, end) = keys::prefix_range(keys::TRANSACTION_PREFIX)?;
    let scan = store.range_scan(&start, &end)?;

    Ok(scan
        .map(|item| -> Result<Transaction> {
            let (_, bytes) = item?;
            let transaction: Transaction = serde_json::from_slice(&bytes)?;
            Ok(transaction)
        })
        .filter(move |item| match item {
            Ok(transaction) => filter.matches(transaction),
            Err(_) => true,
        }))
}
