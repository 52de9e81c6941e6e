//! Property-based tests for ledger invariants
//!
//! These tests use proptest to verify critical invariants:
//! - Asset conservation: transfers move amounts, never create them
//! - No negative holdings
//! - One transaction per successful transfer, ids strictly increasing
//! - Deterministic replay: same invocations + same clock → same store
//! - All-or-nothing: failed invocations leave the store unchanged

use asset_ledger::{
    engine::apply_transfer, registry, Account, Error, Executor, FixedClock, MemoryStore,
    Transaction,
};
use proptest::prelude::*;
use rust_decimal::Decimal;

const ACCOUNT_KEYS: [&str; 5] = ["CLIENT0", "CLIENT1", "CLIENT2", "CLIENT3", "CLIENT4"];
const ASSET_IDS: [&str; 5] = ["A1", "A2", "A3", "A4", "A5"];

/// One transfer instruction as the host would send it
#[derive(Debug, Clone)]
struct Instruction {
    seller: usize,
    buyer: usize,
    asset: usize,
    amount: Decimal,
}

impl Instruction {
    fn args(&self) -> Vec<String> {
        vec![
            ACCOUNT_KEYS[self.seller].to_string(),
            ACCOUNT_KEYS[self.buyer].to_string(),
            ASSET_IDS[self.asset].to_string(),
            self.amount.to_string(),
        ]
    }
}

/// Strategy for generating valid amounts (positive, two decimals, up to 4000)
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..400_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for generating transfer instructions between distinct accounts
fn instruction_strategy() -> impl Strategy<Value = Instruction> {
    (0usize..5, 1usize..5, 0usize..5, amount_strategy()).prop_map(
        |(seller, offset, asset, amount)| Instruction {
            seller,
            buyer: (seller + offset) % 5,
            asset,
            amount,
        },
    )
}

fn seeded_executor() -> Executor<MemoryStore> {
    let executor = Executor::new(MemoryStore::new()).with_clock(FixedClock(1_700_000_000));
    executor.invoke("init_ledger", vec![]).unwrap();
    executor
}

fn accounts(executor: &Executor<MemoryStore>) -> Vec<Account> {
    ACCOUNT_KEYS
        .iter()
        .map(|key| {
            let bytes = executor.invoke("get_account", vec![key.to_string()]).unwrap();
            serde_json::from_slice(&bytes).unwrap()
        })
        .collect()
}

fn total(accounts: &[Account], asset_id: &str) -> Decimal {
    accounts.iter().map(|a| a.balance(asset_id)).sum()
}

fn transactions(executor: &Executor<MemoryStore>) -> Vec<Transaction> {
    let bytes = executor
        .invoke("list_transactions", vec!["ALL".to_string()])
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: totals per asset are conserved and no holding goes negative
    #[test]
    fn prop_asset_conservation(instructions in prop::collection::vec(instruction_strategy(), 1..40)) {
        let executor = seeded_executor();
        let before = accounts(&executor);

        for instruction in &instructions {
            let _ = executor.invoke("transfer", instruction.args());
        }

        let after = accounts(&executor);
        for asset_id in ASSET_IDS {
            prop_assert_eq!(total(&before, asset_id), total(&after, asset_id));
        }
        for account in &after {
            prop_assert!(account.holdings.iter().all(|h| h.amount >= Decimal::ZERO));
            prop_assert!(account.duplicate_holding().is_none());
        }
    }

    /// Property: a transfer succeeds exactly when the seller holds enough,
    /// and each success appends one matching transaction
    #[test]
    fn prop_one_transaction_per_success(instructions in prop::collection::vec(instruction_strategy(), 1..40)) {
        let executor = seeded_executor();
        let mut successes = Vec::new();

        for instruction in &instructions {
            let held = accounts(&executor)[instruction.seller].balance(ASSET_IDS[instruction.asset]);
            match executor.invoke("transfer", instruction.args()) {
                Ok(_) => {
                    prop_assert!(held >= instruction.amount);
                    successes.push(instruction.clone());
                }
                Err(Error::InsufficientFunds(_)) => prop_assert!(held < instruction.amount),
                Err(e) => prop_assert!(false, "unexpected error: {}", e),
            }
        }

        let log = transactions(&executor);
        prop_assert_eq!(log.len(), successes.len());
        prop_assert!(log.windows(2).all(|w| w[0].id < w[1].id));

        for (tx, instruction) in log.iter().zip(&successes) {
            prop_assert_eq!(&tx.seller_account_id, ACCOUNT_KEYS[instruction.seller]);
            prop_assert_eq!(&tx.buyer_account_id, ACCOUNT_KEYS[instruction.buyer]);
            prop_assert_eq!(&tx.asset.id, ASSET_IDS[instruction.asset]);
            prop_assert_eq!(tx.asset.amount, instruction.amount);
        }
    }

    /// Property: replaying the same invocations yields an identical store
    #[test]
    fn prop_deterministic_replay(instructions in prop::collection::vec(instruction_strategy(), 1..30)) {
        let first = seeded_executor();
        let second = seeded_executor();

        for instruction in &instructions {
            let a = first.invoke("transfer", instruction.args());
            let b = second.invoke("transfer", instruction.args());
            prop_assert_eq!(a.is_ok(), b.is_ok());
        }

        prop_assert_eq!(first.backend().entries(), second.backend().entries());
    }

    /// Property: failed transfers leave the store byte-identical
    #[test]
    fn prop_failed_transfer_has_no_effect(seller in 0usize..5, asset in 0usize..5, excess in 1i64..1_000_000i64) {
        let executor = seeded_executor();
        let before = executor.backend().entries();

        let held = accounts(&executor)[seller].balance(ASSET_IDS[asset]);
        let instruction = Instruction {
            seller,
            buyer: (seller + 1) % 5,
            asset,
            amount: held + Decimal::new(excess, 2),
        };

        let result = executor.invoke("transfer", instruction.args());
        prop_assert!(matches!(result, Err(Error::InsufficientFunds(_))));
        prop_assert_eq!(executor.backend().entries(), before);
    }

    /// Property: the pure transfer step moves exactly the amount
    #[test]
    fn prop_apply_transfer_moves_exact_amount(asset in 0usize..5, cents in 1i64..250_000i64) {
        // CLIENT0 holds 2500 of every asset
        let amount = Decimal::new(cents, 2);
        let mut seeded = registry::genesis_accounts();
        let mut buyer = seeded.remove(4);
        let mut seller = seeded.remove(0);
        let asset_id = ASSET_IDS[asset];
        let (seller_before, buyer_before) = (seller.balance(asset_id), buyer.balance(asset_id));

        let moved = apply_transfer(&mut seller, &mut buyer, asset_id, amount).unwrap();

        prop_assert_eq!(moved.amount, amount);
        prop_assert_eq!(seller.balance(asset_id), seller_before - amount);
        prop_assert_eq!(buyer.balance(asset_id), buyer_before + amount);
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn test_reference_transfer() {
        let executor = seeded_executor();

        executor
            .invoke(
                "transfer",
                vec!["CLIENT0".into(), "CLIENT1".into(), "A1".into(), "1000".into()],
            )
            .unwrap();

        let after = accounts(&executor);
        assert_eq!(after[0].balance("A1"), Decimal::new(1500, 0));
        assert_eq!(after[1].balance("A1"), Decimal::new(2500, 0));

        let log = transactions(&executor);
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].asset.id, "A1");
        assert_eq!(log[0].asset.amount, Decimal::new(1000, 0));
    }

    #[test]
    fn test_participant_query_after_mixed_traffic() {
        let executor = seeded_executor();
        let transfer = |seller: &str, buyer: &str, asset: &str, amount: &str| {
            executor.invoke(
                "transfer",
                vec![seller.into(), buyer.into(), asset.into(), amount.into()],
            )
        };

        transfer("CLIENT0", "CLIENT4", "A1", "100").unwrap();
        transfer("CLIENT4", "CLIENT2", "A1", "40").unwrap();
        assert!(transfer("CLIENT2", "CLIENT3", "A4", "9999").is_err());
        transfer("CLIENT3", "CLIENT1", "A2", "0.5").unwrap();

        let bytes = executor
            .invoke("list_transactions", vec!["CLIENT4".to_string()])
            .unwrap();
        let client4: Vec<Transaction> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(client4.len(), 2);

        assert_eq!(transactions(&executor).len(), 3);

        // CLIENT4 received a new A1 holding and passed some of it on
        let after = accounts(&executor);
        assert_eq!(after[4].balance("A1"), Decimal::new(60, 0));
        assert_eq!(after[2].balance("A1"), Decimal::new(540, 0));
    }

    #[test]
    fn test_no_capacity_limit_on_log() {
        let executor = seeded_executor();
        for _ in 0..1100 {
            executor
                .invoke(
                    "transfer",
                    vec!["CLIENT4".into(), "CLIENT0".into(), "A5".into(), "1".into()],
                )
                .unwrap();
        }
        assert_eq!(transactions(&executor).len(), 1100);
    }
}
