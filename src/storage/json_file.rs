use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::engine::{NewTransaction, Transaction, TransactionId, TransactionPatch};
use crate::storage::{StorageError, TransactionStore, new_id};

const TMP_SUFFIX: &str = "tmp";

/// Stores the whole collection as one JSON document.
///
/// Every call reads the file again, so several processes pointed at the same
/// file see each other's writes (last write wins).
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    fn read(&self) -> Result<Vec<Transaction>, StorageError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No store at {:?}, starting empty", self.path);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        if data.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&data)?)
    }

    fn write(&self, transactions: &[Transaction]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(transactions)?;

        let tmp = tmp_path(&self.path);
        let mut file = File::create(&tmp)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp, &self.path)?;

        log::debug!("Wrote {} transactions to {:?}", transactions.len(), self.path);
        Ok(())
    }
}

/// `ledger.json` is written through `ledger.json.tmp`.
fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

impl TransactionStore for JsonFileStore {
    fn list_all(&self) -> Result<Vec<Transaction>, StorageError> {
        self.read()
    }

    fn create(&mut self, record: NewTransaction) -> Result<TransactionId, StorageError> {
        let mut transactions = self.read()?;
        let id = new_id();
        transactions.push(record.into_transaction(id.clone()));
        self.write(&transactions)?;
        Ok(id)
    }

    fn update(&mut self, id: &TransactionId, patch: TransactionPatch) -> Result<(), StorageError> {
        let mut transactions = self.read()?;
        let tx = transactions
            .iter_mut()
            .find(|tx| &tx.id == id)
            .ok_or_else(|| StorageError::NotFound(id.clone()))?;
        patch.apply_to(tx);
        self.write(&transactions)
    }

    fn delete(&mut self, id: &TransactionId) -> Result<(), StorageError> {
        let mut transactions = self.read()?;
        let before = transactions.len();
        transactions.retain(|tx| &tx.id != id);
        if transactions.len() == before {
            log::debug!("Delete of unknown transaction {id} ignored");
            return Ok(());
        }
        self.write(&transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Amount, TransactionType};
    use tempfile::tempdir;

    fn record(description: &str, typ: TransactionType, units: i64) -> NewTransaction {
        NewTransaction {
            amount: Amount::from_units(units).unwrap(),
            description: description.into(),
            typ,
            date: "2024-02-10T12:00:00Z".parse().unwrap(),
        }
    }

    #[test]
    fn test_that_missing_file_is_an_empty_store() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("ledger.json"));
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_that_records_survive_reopening() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("ledger.json");

        let mut store = JsonFileStore::new(&path);
        let id = store
            .create(record("Salary", TransactionType::Income, 100))
            .unwrap();
        store
            .create(record("Food", TransactionType::Expense, 30))
            .unwrap();

        let reopened = JsonFileStore::new(&path);
        let all = reopened.list_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, id);
        assert_eq!(all[0].description, "Salary");
        assert_eq!(all[1].typ, TransactionType::Expense);
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn test_that_update_leaves_date_untouched() {
        let dir = tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("ledger.json"));
        let id = store
            .create(record("Gift", TransactionType::Income, 5))
            .unwrap();
        let date = store.list_all().unwrap()[0].date;

        store
            .update(
                &id,
                TransactionPatch {
                    amount: Amount::from_units(7).unwrap(),
                    description: "Birthday gift".into(),
                    typ: TransactionType::Income,
                },
            )
            .unwrap();

        let stored = &store.list_all().unwrap()[0];
        assert_eq!(stored.id, id);
        assert_eq!(stored.date, date);
        assert_eq!(stored.amount, Amount::from_units(7).unwrap());
        assert_eq!(stored.description, "Birthday gift");
    }

    #[test]
    fn test_that_delete_removes_only_the_given_id() {
        let dir = tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("ledger.json"));
        let keep = store
            .create(record("Keep", TransactionType::Income, 1))
            .unwrap();
        let drop = store
            .create(record("Drop", TransactionType::Income, 2))
            .unwrap();

        store.delete(&drop).unwrap();
        store.delete(&TransactionId::new("unknown")).unwrap();

        let all = store.list_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, keep);
    }

    #[test]
    fn test_that_temp_file_keeps_the_store_extension() {
        assert_eq!(
            tmp_path(Path::new("data/ledger.json")),
            PathBuf::from("data/ledger.json.tmp")
        );
        assert_eq!(tmp_path(Path::new("ledger")), PathBuf::from("ledger.tmp"));
        assert_eq!(
            tmp_path(Path::new("ledger.tmp")),
            PathBuf::from("ledger.tmp.tmp")
        );
    }

    #[test]
    fn test_that_tmp_named_store_keeps_earlier_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.tmp");

        let mut store = JsonFileStore::new(&path);
        store
            .create(record("Salary", TransactionType::Income, 100))
            .unwrap();
        store
            .create(record("Food", TransactionType::Expense, 30))
            .unwrap();

        let all = JsonFileStore::new(&path).list_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].description, "Salary");
        assert!(!dir.path().join("ledger.tmp.tmp").exists());
    }

    #[test]
    fn test_that_sibling_stores_do_not_share_a_temp_file() {
        let dir = tempdir().unwrap();
        let mut json = JsonFileStore::new(dir.path().join("ledger.json"));
        let mut other = JsonFileStore::new(dir.path().join("ledger.csv"));

        json.create(record("A", TransactionType::Income, 1)).unwrap();
        other.create(record("B", TransactionType::Income, 2)).unwrap();

        assert_eq!(json.list_all().unwrap()[0].description, "A");
        assert_eq!(other.list_all().unwrap()[0].description, "B");
        assert!(!dir.path().join("ledger.tmp").exists());
    }

    #[test]
    fn test_that_corrupt_file_is_a_storage_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        fs::write(&path, "{ not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(store.list_all(), Err(StorageError::Serde(_))));
    }
}
