mod amount;
mod ledger;
mod record;
mod transaction;

pub use amount::{Amount, AmountError};
pub use ledger::{
    LedgerError, balance_excluding, compute_balance, sort_by_date_descending, validate_mutation,
};
pub use record::{InputRecord, TransactionSnapshot};
pub use transaction::{
    NewTransaction, Transaction, TransactionId, TransactionPatch, TransactionType,
};
