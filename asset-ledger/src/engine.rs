//! Transfer engine
//!
//! Moves an amount of one asset from a seller account to a buyer account
//! and records the move in the transaction log.
//!
//! # Invariants
//!
//! - `0 < amount <= seller holding` before the move
//! - Seller holding decreases by exactly `amount`, never below zero
//! - Buyer holding increases by exactly `amount`, or is created with it
//! - Seller, buyer and transaction are written in the same store transaction

use crate::{
    registry, store::StateStore, txlog,
    types::{Account, Asset, Transaction},
    Error, Result,
};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Typed transfer instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    /// Seller account key
    pub seller_key: String,
    /// Buyer account key
    pub buyer_key: String,
    /// Asset id to move
    pub asset_id: String,
    /// Amount to move (positive)
    pub amount: Decimal,
}

impl TransferRequest {
    /// Build a request from its string arguments
    pub fn parse(seller_key: String, buyer_key: String, asset_id: String, amount: &str) -> Result<Self> {
        Ok(Self {
            seller_key,
            buyer_key,
            asset_id,
            amount: parse_amount(amount)?,
        })
    }
}

/// Parse a positive decimal amount ("1000", "12.5", "1e3")
pub fn parse_amount(raw: &str) -> Result<Decimal> {
    let raw = raw.trim();
    // rust_decimal accepts `_` digit separators
    if raw.contains('_') {
        return Err(Error::Validation(format!("Amount {:?} is not a number", raw)));
    }
    let amount = Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| Error::Validation(format!("Amount {:?} is not a number", raw)))?;

    if amount <= Decimal::ZERO {
        return Err(Error::Validation(format!("Amount must be positive, got {}", amount)));
    }
    Ok(amount.normalize())
}

/// Move `amount` of `asset_id` between two decoded accounts
///
/// Returns the snapshot recorded in the transaction. Leaves both accounts
/// untouched on error.
pub fn apply_transfer(
    seller: &mut Account,
    buyer: &mut Account,
    asset_id: &str,
    amount: Decimal,
) -> Result<Asset> {
    if amount <= Decimal::ZERO {
        return Err(Error::Validation(format!("Amount must be positive, got {}", amount)));
    }

    let seller_id = seller.id.clone();
    let holding = seller.holding_mut(asset_id).ok_or_else(|| {
        Error::InsufficientFunds(format!("Account {} does not hold asset {}", seller_id, asset_id))
    })?;

    if holding.amount < amount {
        return Err(Error::InsufficientFunds(format!(
            "Account {} holds {} of asset {}, requested {}",
            seller_id, holding.amount, asset_id, amount
        )));
    }

    holding.amount -= amount;
    let moved = Asset::new(holding.name.clone(), holding.id.clone(), amount);

    match buyer.holding_mut(asset_id) {
        Some(existing) => existing.amount += amount,
        None => buyer.holdings.push(moved.clone()),
    }

    Ok(moved)
}

/// Execute a transfer against the store
///
/// Writes the seller, the buyer, the new transaction and the advanced id
/// counter. The caller's store transaction decides whether they commit.
pub fn transfer<S: StateStore + ?Sized>(
    store: &mut S,
    request: &TransferRequest,
    timestamp: i64,
) -> Result<Transaction> {
    if request.seller_key == request.buyer_key {
        return Err(Error::Validation(format!(
            "Seller and buyer are the same account ({})",
            request.seller_key
        )));
    }

    let tx_id = txlog::next_transaction_id(store)?;

    let mut seller = registry::get_account(store, &request.seller_key)?;
    let mut buyer = registry::get_account(store, &request.buyer_key)?;

    let moved = apply_transfer(&mut seller, &mut buyer, &request.asset_id, request.amount)?;

    let transaction = Transaction {
        id: tx_id,
        seller_account_id: request.seller_key.clone(),
        buyer_account_id: request.buyer_key.clone(),
        asset: moved,
        timestamp,
    };

    registry::put_account(store, &request.seller_key, &seller)?;
    registry::put_account(store, &request.buyer_key, &buyer)?;
    txlog::append(store, &transaction)?;

    tracing::info!(
        tx_id = %transaction.id,
        seller = %transaction.seller_account_id,
        buyer = %transaction.buyer_account_id,
        asset_id = %transaction.asset.id,
        amount = %transaction.asset.amount,
        "Transfer executed"
    );

    Ok(transaction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreTransaction};

    fn request(seller: &str, buyer: &str, asset_id: &str, amount: &str) -> TransferRequest {
        TransferRequest::parse(seller.into(), buyer.into(), asset_id.into(), amount).unwrap()
    }

    fn seeded(backend: &MemoryStore) {
        let mut store = StoreTransaction::begin(backend);
        registry::bulk_load(&mut store, &registry::genesis_accounts()).unwrap();
        store.commit().unwrap();
    }

    #[test]
    fn test_transfer_existing_holding() {
        let backend = MemoryStore::new();
        seeded(&backend);
        let mut store = StoreTransaction::begin(&backend);

        let tx = transfer(&mut store, &request("CLIENT0", "CLIENT1", "A1", "1000"), 42).unwrap();

        let seller = registry::get_account(&store, "CLIENT0").unwrap();
        let buyer = registry::get_account(&store, "CLIENT1").unwrap();
        assert_eq!(seller.balance("A1"), Decimal::new(1500, 0));
        assert_eq!(buyer.balance("A1"), Decimal::new(2500, 0));

        assert_eq!(tx.asset.id, "A1");
        assert_eq!(tx.asset.name, "ATVI");
        assert_eq!(tx.asset.amount, Decimal::new(1000, 0));
        assert_eq!(tx.timestamp, 42);
        assert_eq!(txlog::get_transaction(&store, &tx.id).unwrap(), tx);
    }

    #[test]
    fn test_transfer_creates_holding() {
        let backend = MemoryStore::new();
        seeded(&backend);
        let mut store = StoreTransaction::begin(&backend);

        // CLIENT4 holds only A4 and A5
        transfer(&mut store, &request("CLIENT0", "CLIENT4", "A2", "12.5"), 0).unwrap();

        let buyer = registry::get_account(&store, "CLIENT4").unwrap();
        assert_eq!(buyer.holdings.len(), 3);
        let created = buyer.holdings.last().unwrap();
        assert_eq!(created.id, "A2");
        assert_eq!(created.name, "BABA");
        assert_eq!(created.amount, Decimal::new(125, 1));
    }

    #[test]
    fn test_transfer_whole_holding_leaves_zero() {
        let backend = MemoryStore::new();
        seeded(&backend);
        let mut store = StoreTransaction::begin(&backend);

        transfer(&mut store, &request("CLIENT2", "CLIENT3", "A5", "500"), 0).unwrap();

        let seller = registry::get_account(&store, "CLIENT2").unwrap();
        assert_eq!(seller.holding("A5").unwrap().amount, Decimal::ZERO);
    }

    #[test]
    fn test_insufficient_funds() {
        let backend = MemoryStore::new();
        seeded(&backend);
        let mut store = StoreTransaction::begin(&backend);

        let err = transfer(&mut store, &request("CLIENT2", "CLIENT1", "A1", "500.01"), 0).unwrap_err();
        assert!(matches!(err, Error::InsufficientFunds(_)));

        // CLIENT4 does not hold A1 at all
        let err = transfer(&mut store, &request("CLIENT4", "CLIENT1", "A1", "1"), 0).unwrap_err();
        assert!(matches!(err, Error::InsufficientFunds(_)));
    }

    #[test]
    fn test_missing_account() {
        let backend = MemoryStore::new();
        seeded(&backend);
        let mut store = StoreTransaction::begin(&backend);

        let err = transfer(&mut store, &request("CLIENT0", "CLIENT77", "A1", "1"), 0).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_self_transfer_rejected() {
        let backend = MemoryStore::new();
        seeded(&backend);
        let mut store = StoreTransaction::begin(&backend);

        let err = transfer(&mut store, &request("CLIENT0", "CLIENT0", "A1", "1"), 0).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(store.pending_writes(), 0);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1000").unwrap(), Decimal::new(1000, 0));
        assert_eq!(parse_amount(" 2.50 ").unwrap(), Decimal::new(25, 1));
        assert_eq!(parse_amount("1e3").unwrap(), Decimal::new(1000, 0));

        assert!(matches!(parse_amount("0"), Err(Error::Validation(_))));
        assert!(matches!(parse_amount("-5"), Err(Error::Validation(_))));
        assert!(matches!(parse_amount("ten"), Err(Error::Validation(_))));
        assert!(matches!(parse_amount(""), Err(Error::Validation(_))));
    }

    #[test]
    fn test_parse_amount_rejects_digit_separators() {
        assert!(matches!(parse_amount("1_000"), Err(Error::Validation(_))));
        assert!(matches!(parse_amount("2.5_0"), Err(Error::Validation(_))));
    }

    #[test]
    fn test_apply_transfer_reports_seller() {
        let mut accounts = registry::genesis_accounts();
        let mut buyer = accounts.remove(4); // ORBIS GROUP, A4 and A5 only
        let mut seller = accounts.remove(3); // PFPC-DFA, A1..A3

        let err = apply_transfer(&mut seller, &mut buyer, "A4", Decimal::ONE).unwrap_err();
        assert!(matches!(err, Error::InsufficientFunds(_)));
        assert!(err.to_string().contains("20180003"));

        let err = apply_transfer(&mut seller, &mut buyer, "A1", Decimal::new(1501, 0)).unwrap_err();
        assert!(err.to_string().contains("20180003"));

        let moved = apply_transfer(&mut seller, &mut buyer, "A1", Decimal::new(1500, 0)).unwrap();
        assert_eq!(moved, Asset::new("ATVI", "A1", Decimal::new(1500, 0)));
        assert_eq!(seller.balance("A1"), Decimal::ZERO);
        assert_eq!(buyer.balance("A1"), Decimal::new(1500, 0));
    }

    #[test]
    fn test_apply_transfer_failure_leaves_accounts() {
        let mut accounts = registry::genesis_accounts();
        let mut buyer = accounts.remove(1);
        let mut seller = accounts.remove(1); // SOLAR CAPITAL, 500 each
        let (seller_before, buyer_before) = (seller.clone(), buyer.clone());

        let err = apply_transfer(&mut seller, &mut buyer, "A1", Decimal::new(501, 0)).unwrap_err();
        assert!(matches!(err, Error::InsufficientFunds(_)));
        assert_eq!(seller, seller_before);
        assert_eq!(buyer, buyer_before);
    }
}
