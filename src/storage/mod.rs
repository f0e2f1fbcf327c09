//! Persistence boundary for transactions.
//!
//! The manager only talks to a [`TransactionStore`]; where the records live
//! (memory, a JSON document on disk) is up to the implementation.

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use thiserror::Error;

use crate::engine::{NewTransaction, Transaction, TransactionId, TransactionPatch};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Transaction not found in store: {0}")]
    NotFound(TransactionId),
}

/// Create/list/update/delete of transaction records keyed by an opaque id.
pub trait TransactionStore {
    /// Every stored transaction, in no particular order.
    fn list_all(&self) -> Result<Vec<Transaction>, StorageError>;

    /// Store a new record and return the id assigned to it.
    fn create(&mut self, record: NewTransaction) -> Result<TransactionId, StorageError>;

    /// Replace amount, description and type of `id`. The date is left untouched.
    fn update(&mut self, id: &TransactionId, patch: TransactionPatch) -> Result<(), StorageError>;

    /// Remove `id`. Removing an id that is not stored is not an error.
    fn delete(&mut self, id: &TransactionId) -> Result<(), StorageError>;
}

fn new_id() -> TransactionId {
    TransactionId::new(uuid::Uuid::new_v4().to_string())
}
