//! Core types for the ledger
//!
//! Records are stored as JSON under the legacy wire field names. The
//! misspelled `SafeKeepingAccount` and `ssgstatus` keys are accepted on
//! read. Amounts are exact decimals serialized as JSON numbers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One balance entry within an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Display name (ticker)
    #[serde(rename = "assetname")]
    pub name: String,

    /// Asset identifier, unique within an account
    #[serde(rename = "assetid")]
    pub id: String,

    /// Held amount (never negative)
    #[serde(rename = "assetamount", with = "rust_decimal::serde::arbitrary_precision")]
    pub amount: Decimal,
}

impl Asset {
    /// Create a new holding
    pub fn new(name: impl Into<String>, id: impl Into<String>, amount: Decimal) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            amount,
        }
    }
}

/// Custody account holding a set of asset balances
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Client name
    pub name: String,

    /// Client identifier
    #[serde(rename = "clientid")]
    pub id: String,

    /// Client type ("Admin", "Regular", ...)
    #[serde(rename = "clienttype")]
    pub account_type: String,

    /// Safekeeping (custody) account number
    #[serde(rename = "safekeepingaccount", alias = "SafeKeepingAccount")]
    pub custody_account: String,

    /// Reporting currency code, free-form ("USD", "CHF", ...)
    pub currency: String,

    /// Holdings, in insertion order
    #[serde(rename = "asset", default)]
    pub holdings: Vec<Asset>,

    /// Account status
    pub status: String,
}

impl Account {
    /// Find the holding for an asset id
    pub fn holding(&self, asset_id: &str) -> Option<&Asset> {
        self.holdings.iter().find(|asset| asset.id == asset_id)
    }

    /// Find the holding for an asset id (mutable)
    pub fn holding_mut(&mut self, asset_id: &str) -> Option<&mut Asset> {
        self.holdings.iter_mut().find(|asset| asset.id == asset_id)
    }

    /// Amount held of an asset (zero when not held)
    pub fn balance(&self, asset_id: &str) -> Decimal {
        self.holding(asset_id)
            .map(|asset| asset.amount)
            .unwrap_or(Decimal::ZERO)
    }

    /// First asset id that appears more than once, if any
    pub fn duplicate_holding(&self) -> Option<&str> {
        self.holdings.iter().enumerate().find_map(|(i, asset)| {
            self.holdings[..i]
                .iter()
                .any(|earlier| earlier.id == asset.id)
                .then_some(asset.id.as_str())
        })
    }
}

/// Immutable log entry produced by exactly one successful transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction id (also its store key)
    #[serde(rename = "tsid")]
    pub id: String,

    /// Seller account key
    #[serde(rename = "seller")]
    pub seller_account_id: String,

    /// Buyer account key
    #[serde(rename = "buyer")]
    pub buyer_account_id: String,

    /// Snapshot of the transferred asset (amount = transferred amount)
    pub asset: Asset,

    /// UTC seconds since the Unix epoch
    pub timestamp: i64,
}

impl Transaction {
    /// Whether an account key took part as seller or buyer
    pub fn involves(&self, account_key: &str) -> bool {
        self.seller_account_id == account_key || self.buyer_account_id == account_key
    }
}

/// Auxiliary message record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message id
    #[serde(rename = "msgid")]
    pub id: String,

    /// Message body
    #[serde(rename = "msgcontent")]
    pub content: String,

    /// Processing status
    #[serde(rename = "msgstatus", alias = "ssgstatus")]
    pub status: String,

    /// Message type (e.g. "MT103")
    #[serde(rename = "msgtype")]
    pub message_type: String,

    /// UTC seconds since the Unix epoch, assigned on creation
    pub timestamp: i64,
}

/// Account together with the key it is stored under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyedAccount {
    /// Store key
    #[serde(rename = "Key")]
    pub key: String,

    /// Decoded account
    #[serde(rename = "Record")]
    pub record: Account,
}
