//! Personal income/expense ledger: a running balance over recorded
//! transactions, with validated writes through a pluggable store.

pub mod engine;
pub mod manager;
pub mod storage;

pub use manager::{Form, FormMode, LedgerView, ManagerError, TransactionManager};
