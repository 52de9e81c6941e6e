//! Operation surface
//!
//! The closed set of operations the ledger exposes. A host hands over an
//! operation name plus a flat list of string arguments; [`Operation::parse`]
//! resolves the name through [`OPERATIONS`], checks the argument count and
//! builds the typed variant. [`Operation::apply`] runs it against a store.

use crate::{
    engine::{self, TransferRequest},
    message::{self, NewMessage},
    query::{self, TransactionFilter},
    registry,
    store::StateStore,
    types::{KeyedAccount, Transaction},
    Error, Result,
};

/// One typed ledger operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Seed the five demo accounts
    InitLedger,
    /// Move an asset between two accounts
    Transfer(TransferRequest),
    /// All accounts as `[{Key, Record}]`
    ListAccounts,
    /// Transactions, all or by participant
    ListTransactions(TransactionFilter),
    /// Raw account bytes
    GetAccount {
        /// Account key
        key: String,
    },
    /// Create or overwrite a message
    SetMessage(NewMessage),
    /// Raw message bytes
    GetMessage {
        /// Message id
        id: String,
    },
    /// Replace a message's status
    UpdateMessageStatus {
        /// Message id
        id: String,
        /// New status
        status: String,
    },
}

/// Lookup table entry
#[derive(Debug)]
pub struct OperationSpec {
    /// Canonical operation name
    pub name: &'static str,
    /// Names accepted from older clients
    pub aliases: &'static [&'static str],
    /// Usage string for argument errors
    pub usage: &'static str,
    /// Exact number of arguments
    pub arity: usize,
    build: fn(Vec<String>) -> Result<Operation>,
}

impl OperationSpec {
    fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.aliases.contains(&name)
    }
}

/// Every operation the ledger answers to
pub static OPERATIONS: &[OperationSpec] = &[
    OperationSpec {
        name: "init_ledger",
        aliases: &["initLedger"],
        usage: "init_ledger",
        arity: 0,
        build: |_| Ok(Operation::InitLedger),
    },
    OperationSpec {
        name: "transfer",
        aliases: &["doInnerTransaction"],
        usage: "transfer <seller_key> <buyer_key> <asset_id> <amount>",
        arity: 4,
        build: |args| {
            let [seller, buyer, asset_id, amount] = take::<4>(args);
            Ok(Operation::Transfer(TransferRequest::parse(
                seller, buyer, asset_id, &amount,
            )?))
        },
    },
    OperationSpec {
        name: "list_accounts",
        aliases: &["queryAllAsset"],
        usage: "list_accounts",
        arity: 0,
        build: |_| Ok(Operation::ListAccounts),
    },
    OperationSpec {
        name: "list_transactions",
        aliases: &["queryTransactions"],
        usage: "list_transactions <account_key|ALL>",
        arity: 1,
        build: |args| {
            let [filter] = take::<1>(args);
            Ok(Operation::ListTransactions(TransactionFilter::from_arg(filter)))
        },
    },
    OperationSpec {
        name: "get_account",
        aliases: &["queryClientInfo"],
        usage: "get_account <account_key>",
        arity: 1,
        build: |args| {
            let [key] = take::<1>(args);
            Ok(Operation::GetAccount { key })
        },
    },
    OperationSpec {
        name: "set_message",
        aliases: &["setSwiftMessage"],
        usage: "set_message <id> <content> <status> <type>",
        arity: 4,
        build: |args| {
            let [id, content, status, message_type] = take::<4>(args);
            Ok(Operation::SetMessage(NewMessage {
                id,
                content,
                status,
                message_type,
            }))
        },
    },
    OperationSpec {
        name: "get_message",
        aliases: &["getSwiftMessage"],
        usage: "get_message <id>",
        arity: 1,
        build: |args| {
            let [id] = take::<1>(args);
            Ok(Operation::GetMessage { id })
        },
    },
    OperationSpec {
        name: "update_message_status",
        aliases: &["updateSwiftMessage"],
        usage: "update_message_status <id> <new_status>",
        arity: 2,
        build: |args| {
            let [id, status] = take::<2>(args);
            Ok(Operation::UpdateMessageStatus { id, status })
        },
    },
];

/// Arity is checked before `build` runs
fn take<const N: usize>(args: Vec<String>) -> [String; N] {
    let mut args = args.into_iter();
    std::array::from_fn(|_| args.next().unwrap_or_default())
}

impl Operation {
    /// Resolve a named invocation into a typed operation
    pub fn parse(name: &str, args: Vec<String>) -> Result<Self> {
        let spec = OPERATIONS
            .iter()
            .find(|spec| spec.answers_to(name))
            .ok_or_else(|| Error::Validation(format!("Unknown operation: {}", name)))?;

        if args.len() != spec.arity {
            return Err(Error::Validation(format!(
                "Incorrect number of arguments for {}: expected {}, got {} (usage: {})",
                spec.name,
                spec.arity,
                args.len(),
                spec.usage
            )));
        }

        (spec.build)(args)
    }

    /// Canonical operation name
    pub fn name(&self) -> &'static str {
        match self {
            Operation::InitLedger => "init_ledger",
            Operation::Transfer(_) => "transfer",
            Operation::ListAccounts => "list_accounts",
            Operation::ListTransactions(_) => "list_transactions",
            Operation::GetAccount { .. } => "get_account",
            Operation::SetMessage(_) => "set_message",
            Operation::GetMessage { .. } => "get_message",
            Operation::UpdateMessageStatus { .. } => "update_message_status",
        }
    }

    /// Whether the operation can write to the store
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Operation::InitLedger
                | Operation::Transfer(_)
                | Operation::SetMessage(_)
                | Operation::UpdateMessageStatus { .. }
        )
    }

    /// Run against a store, returning the response payload
    ///
    /// Mutating operations return an empty payload.
    pub fn apply<S: StateStore + ?Sized>(&self, store: &mut S, timestamp: i64) -> Result<Vec<u8>> {
        match self {
            Operation::InitLedger => {
                registry::bulk_load(store, &registry::genesis_accounts())?;
                Ok(Vec::new())
            }
            Operation::Transfer(request) => {
                engine::transfer(store, request, timestamp)?;
                Ok(Vec::new())
            }
            Operation::ListAccounts => {
                let accounts = query::list_accounts(store)?
                    .map(|item| item.map(|(key, record)| KeyedAccount { key, record }))
                    .collect::<Result<Vec<_>>>()?;
                Ok(serde_json::to_vec(&accounts)?)
            }
            Operation::ListTransactions(filter) => {
                let transactions = query::list_transactions(store, filter.clone())?
                    .collect::<Result<Vec<Transaction>>>()?;
                Ok(serde_json::to_vec(&transactions)?)
            }
            Operation::GetAccount { key } => registry::get_account_bytes(store, key),
            Operation::SetMessage(new) => {
                message::set_message(store, new.clone(), timestamp)?;
                Ok(Vec::new())
            }
            Operation::GetMessage { id } => message::get_message_bytes(store, id),
            Operation::UpdateMessageStatus { id, status } => {
                message::update_message_status(store, id, status.clone())?;
                Ok(Vec::new())
            }
        }
    }
}
