//! Account registry
//!
//! Accounts live under [`keys::ACCOUNT_PREFIX`]. They are created by
//! genesis bulk-load or external provisioning, mutated only by the
//! transfer engine, and never deleted.

use crate::{
    keys,
    store::StateStore,
    types::{Account, Asset},
    Error, Result,
};
use rust_decimal::Decimal;

/// Raw account bytes stored under `key`
pub fn get_account_bytes<S: StateStore + ?Sized>(store: &S, key: &str) -> Result<Vec<u8>> {
    if !keys::is_account_key(key) {
        return Err(Error::Validation(format!(
            "{:?} is not an account key (expected {}<n>)",
            key,
            keys::ACCOUNT_PREFIX
        )));
    }
    store
        .get(key)?
        .ok_or_else(|| Error::NotFound(format!("Account {}", key)))
}

/// Decoded account stored under `key`
pub fn get_account<S: StateStore + ?Sized>(store: &S, key: &str) -> Result<Account> {
    let bytes = get_account_bytes(store, key)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Write an account under `key`, overwriting any previous record
pub fn put_account<S: StateStore + ?Sized>(
    store: &mut S,
    key: &str,
    account: &Account,
) -> Result<()> {
    if !keys::is_account_key(key) {
        return Err(Error::Validation(format!("{:?} is not an account key", key)));
    }
    if let Some(asset_id) = account.duplicate_holding() {
        return Err(Error::Validation(format!(
            "Account {} holds asset {} more than once",
            account.id, asset_id
        )));
    }
    store.put(key, serde_json::to_vec(account)?)
}

/// Write accounts under `CLIENT0..CLIENT{n-1}`; existing keys are overwritten
pub fn bulk_load<S: StateStore + ?Sized>(store: &mut S, accounts: &[Account]) -> Result<usize> {
    for (index, account) in accounts.iter().enumerate() {
        let key = keys::account_key(index);
        put_account(store, &key, account)?;
        tracing::info!(key = %key, client_id = %account.id, name = %account.name, "Account loaded");
    }
    Ok(accounts.len())
}

/// The five demo accounts seeded by `init_ledger`
pub fn genesis_accounts() -> Vec<Account> {
    fn holdings(amounts: &[(&str, i64)]) -> Vec<Asset> {
        amounts
            .iter()
            .map(|(id, amount)| Asset::new(asset_name(id), *id, Decimal::new(*amount, 0)))
            .collect()
    }

    fn client(name: &str, id: &str, account_type: &str, custody: &str, assets: Vec<Asset>) -> Account {
        Account {
            name: name.to_string(),
            id: id.to_string(),
            account_type: account_type.to_string(),
            custody_account: custody.to_string(),
            currency: "USD".to_string(),
            holdings: assets,
            status: "active".to_string(),
        }
    }

    let uniform = |amount: i64| {
        holdings(&[
            ("A1", amount),
            ("A2", amount),
            ("A3", amount),
            ("A4", amount),
            ("A5", amount),
        ])
    };

    vec![
        client("CITI ADMINISTRATION", "AD000001", "Admin", "348912452", uniform(2500)),
        client("THE GREENWALL FOUNDATION", "20180001", "Regular", "348912975", uniform(1500)),
        client("SOLAR CAPITAL LTD", "20180002", "Regular", "348912325", uniform(500)),
        client(
            "PFPC-DFA FUNDS-IRISH",
            "20180003",
            "Regular",
            "348912345",
            holdings(&[("A1", 1500), ("A2", 2500), ("A3", 3500)]),
        ),
        client(
            "ORBIS GROUP",
            "20180004",
            "Regular",
            "348912790",
            holdings(&[("A4", 3500), ("A5", 5500)]),
        ),
    ]
}

fn asset_name(id: &str) -> &'static str {
    match id {
        "A1" => "ATVI",
        "A2" => "BABA",
        "A3" => "JD",
        "A4" => "AMD",
        "A5" => "INTEL",
        _ => "UNKNOWN",
    }
}
