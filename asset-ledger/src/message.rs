//! Message record store
//!
//! Auxiliary records kept in the same store as the ledger, under
//! [`keys::MESSAGE_PREFIX`]. Created (or overwritten) by `set_message`,
//! mutated only through `update_message_status`, never deleted.

use crate::{keys, store::StateStore, types::Message, Error, Result};

/// Arguments of `set_message`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    /// Message id
    pub id: String,
    /// Message body
    pub content: String,
    /// Initial status
    pub status: String,
    /// Message type
    pub message_type: String,
}

fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::Validation("Message id must not be empty".to_string()));
    }
    Ok(())
}

/// Create or overwrite a message, stamping it with `timestamp`
pub fn set_message<S: StateStore + ?Sized>(
    store: &mut S,
    new: NewMessage,
    timestamp: i64,
) -> Result<Message> {
    validate_id(&new.id)?;

    let message = Message {
        id: new.id,
        content: new.content,
        status: new.status,
        message_type: new.message_type,
        timestamp,
    };
    store.put(&keys::message_key(&message.id), serde_json::to_vec(&message)?)?;

    tracing::info!(msg_id = %message.id, status = %message.status, "Message stored");
    Ok(message)
}

/// Raw message bytes
pub fn get_message_bytes<S: StateStore + ?Sized>(store: &S, id: &str) -> Result<Vec<u8>> {
    validate_id(id)?;
    store
        .get(&keys::message_key(id))?
        .ok_or_else(|| Error::NotFound(format!("Message {}", id)))
}

/// Decoded message
pub fn get_message<S: StateStore + ?Sized>(store: &S, id: &str) -> Result<Message> {
    let bytes = get_message_bytes(store, id)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Replace only the status of an existing message
pub fn update_message_status<S: StateStore + ?Sized>(
    store: &mut S,
    id: &str,
    status: String,
) -> Result<Message> {
    let mut message = get_message(store, id)?;
    let previous = std::mem::replace(&mut message.status, status);
    store.put(&keys::message_key(id), serde_json::to_vec(&message)?)?;

    tracing::info!(msg_id = %id, from = %previous, to = %message.status, "Message status updated");
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreTransaction};

    fn new_message(id: &str) -> NewMessage {
        NewMessage {
            id: id.to_string(),
            content: ":20:REF123:32A:181001USD1000,".to_string(),
            status: "RECEIVED".to_string(),
            message_type: "MT103".to_string(),
        }
    }

    #[test]
    fn test_set_and_get() {
        let backend = MemoryStore::new();
        let mut store = StoreTransaction::begin(&backend);

        set_message(&mut store, new_message("M1"), 1_538_352_000).unwrap();

        let message = get_message(&store, "M1").unwrap();
        assert_eq!(message.id, "M1");
        assert_eq!(message.status, "RECEIVED");
        assert_eq!(message.message_type, "MT103");
        assert_eq!(message.timestamp, 1_538_352_000);
    }

    #[test]
    fn test_update_status_keeps_other_fields() {
        let backend = MemoryStore::new();
        let mut store = StoreTransaction::begin(&backend);
        let created = set_message(&mut store, new_message("M1"), 7).unwrap();

        update_message_status(&mut store, "M1", "SETTLED".to_string()).unwrap();

        let updated = get_message(&store, "M1").unwrap();
        assert_eq!(updated.status, "SETTLED");
        assert_eq!(updated.content, created.content);
        assert_eq!(updated.message_type, created.message_type);
        assert_eq!(updated.timestamp, created.timestamp);
    }

    #[test]
    fn test_unknown_id() {
        let backend = MemoryStore::new();
        let mut store = StoreTransaction::begin(&backend);

        assert!(matches!(get_message(&store, "nope"), Err(Error::NotFound(_))));
        let err = update_message_status(&mut store, "nope", "X".to_string()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(store.pending_writes(), 0);
    }

    #[test]
    fn test_message_cannot_shadow_account() {
        let backend = MemoryStore::new();
        let mut store = StoreTransaction::begin(&backend);

        set_message(&mut store, new_message("CLIENT0"), 0).unwrap();
        assert!(store.get("CLIENT0").unwrap().is_none());
    }

    #[test]
    fn test_empty_id_rejected() {
        let backend = MemoryStore::new();
        let mut store = StoreTransaction::begin(&backend);

        let err = set_message(&mut store, new_message(""), 0).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
