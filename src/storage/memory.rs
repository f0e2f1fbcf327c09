use crate::engine::{NewTransaction, Transaction, TransactionId, TransactionPatch};
use crate::storage::{StorageError, TransactionStore, new_id};

/// Keeps transactions in insertion order for the lifetime of the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    transactions: Vec<Transaction>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl TransactionStore for MemoryStore {
    fn list_all(&self) -> Result<Vec<Transaction>, StorageError> {
        Ok(self.transactions.clone())
    }

    fn create(&mut self, record: NewTransaction) -> Result<TransactionId, StorageError> {
        let id = new_id();
        self.transactions.push(record.into_transaction(id.clone()));
        Ok(id)
    }

    fn update(&mut self, id: &TransactionId, patch: TransactionPatch) -> Result<(), StorageError> {
        let tx = self
            .transactions
            .iter_mut()
            .find(|tx| &tx.id == id)
            .ok_or_else(|| StorageError::NotFound(id.clone()))?;
        patch.apply_to(tx);
        Ok(())
    }

    fn delete(&mut self, id: &TransactionId) -> Result<(), StorageError> {
        self.transactions.retain(|tx| &tx.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Amount, TransactionType};
    use chrono::Utc;

    fn record(description: &str) -> NewTransaction {
        NewTransaction {
            amount: Amount::from_units(10).unwrap(),
            description: description.into(),
            typ: TransactionType::Income,
            date: Utc::now(),
        }
    }

    #[test]
    fn test_that_created_records_get_unique_ids() {
        let mut store = MemoryStore::new();
        let a = store.create(record("a")).unwrap();
        let b = store.create(record("b")).unwrap();

        assert_ne!(a, b);
        let all = store.list_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, a);
        assert_eq!(all[1].description, "b");
    }

    #[test]
    fn test_that_update_of_unknown_id_fails() {
        let mut store = MemoryStore::new();
        let patch = TransactionPatch {
            amount: Amount::from_units(1).unwrap(),
            description: "x".into(),
            typ: TransactionType::Expense,
        };

        let result = store.update(&TransactionId::new("nope"), patch);
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_that_delete_is_idempotent() {
        let mut store = MemoryStore::new();
        let id = store.create(record("a")).unwrap();

        store.delete(&id).unwrap();
        store.delete(&id).unwrap();
        assert!(store.list_all().unwrap().is_empty());
    }
}
