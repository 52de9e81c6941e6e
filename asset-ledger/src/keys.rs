//! Key space layout
//!
//! ```text
//! CLIENT{n}            accounts (n = genesis/provisioning index)
//! MSG{id}              message records
//! SEQ~TRANC            next transaction sequence number
//! TRANC{seq:020}       transactions, zero padded so key order == creation order
//! ```
//!
//! Every record family is reachable with one prefix range scan. The
//! sequence counter sits outside all of them.

use crate::{Error, Result};

/// Prefix for account records
pub const ACCOUNT_PREFIX: &str = "CLIENT";

/// Prefix for transaction records
pub const TRANSACTION_PREFIX: &str = "TRANC";

/// Prefix for message records
pub const MESSAGE_PREFIX: &str = "MSG";

/// Key holding the last allocated transaction sequence number
pub const TRANSACTION_SEQUENCE_KEY: &str = "SEQ~TRANC";

/// Width of the zero-padded transaction sequence (fits any u64)
const SEQUENCE_WIDTH: usize = 20;

/// Key for the n-th seeded account
pub fn account_key(index: usize) -> String {
    format!("{}{}", ACCOUNT_PREFIX, index)
}

/// Key (and id) for a transaction sequence number
pub fn transaction_key(sequence: u64) -> String {
    format!("{}{:0width$}", TRANSACTION_PREFIX, sequence, width = SEQUENCE_WIDTH)
}

/// Key for a message id
pub fn message_key(id: &str) -> String {
    format!("{}{}", MESSAGE_PREFIX, id)
}

/// Whether a key lies in the account key range
pub fn is_account_key(key: &str) -> bool {
    key.len() > ACCOUNT_PREFIX.len() && key.starts_with(ACCOUNT_PREFIX)
}

/// Half-open `[start, end)` range covering every key with `prefix`
pub fn prefix_range(prefix: &str) -> Result<(String, String)> {
    let mut end = prefix.as_bytes().to_vec();
    match end.last_mut() {
        Some(last) if *last < 0x7f => *last += 1,
        _ => {
            return Err(Error::Storage(format!(
                "Prefix {:?} has no ASCII successor",
                prefix
            )))
        }
    }
    let end = String::from_utf8(end).map_err(|e| Error::Storage(e.to_string()))?;
    Ok((prefix.to_string(), end))
}
