//! Sequences store calls, validates writes against the ledger and keeps the
//! in-memory view in step with the store.
//!
//! After every successful write the whole collection is fetched again and the
//! balance recomputed, so the view never drifts from what is stored.

use chrono::Utc;
use std::fmt;
use thiserror::Error;

use crate::engine::{
    self, Amount, AmountError, LedgerError, NewTransaction, Transaction, TransactionId,
    TransactionPatch, TransactionType,
};
use crate::storage::{StorageError, TransactionStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Amount,
    Description,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Amount => f.write_str("amount"),
            Field::Description => f.write_str("description"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ManagerError {
    #[error("Amount and description are required! (missing {0})")]
    MissingField(Field),

    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    #[error("{0}")]
    Ledger(#[from] LedgerError),

    #[error("Storage failure: {0}")]
    StorageFailure(#[from] StorageError),

    #[error("Transaction not found: {0}")]
    NotFound(TransactionId),

    #[error("Finish or cancel editing {0} before adding a new transaction")]
    EditInProgress(TransactionId),
}

/// What the presentation layer shows: the transactions, most recent first, and
/// the balance derived from them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerView {
    pub transactions: Vec<Transaction>,
    pub balance: Amount,
}

impl LedgerView {
    pub fn find(&self, id: &TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| &tx.id == id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormMode {
    #[default]
    Idle,
    Editing(TransactionId),
}

/// The editable entry form. Fields hold raw text as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    pub amount: String,
    pub description: String,
    pub typ: TransactionType,
    pub mode: FormMode,
}

type Observer = Box<dyn FnMut(&LedgerView)>;

pub struct TransactionManager<S: TransactionStore> {
    store: S,
    view: LedgerView,
    form: Form,
    message: Option<String>,
    observers: Vec<Observer>,
}

impl<S: TransactionStore> TransactionManager<S> {
    /// Wraps `store` without reading it; call [`refresh`](Self::refresh) to load.
    pub fn new(store: S) -> Self {
        TransactionManager {
            store,
            view: LedgerView::default(),
            form: Form::default(),
            message: None,
            observers: Vec::new(),
        }
    }

    /// Builds a manager and loads the current ledger from `store`.
    pub fn open(store: S) -> Result<Self, ManagerError> {
        let mut manager = Self::new(store);
        manager.refresh()?;
        Ok(manager)
    }

    pub fn view(&self) -> &LedgerView {
        &self.view
    }

    pub fn balance(&self) -> Amount {
        self.view.balance
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.view.transactions
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut Form {
        &mut self.form
    }

    /// The single user-visible message; replaced by every operation.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Registers a callback run with the fresh view after every refresh.
    pub fn subscribe(&mut self, observer: impl FnMut(&LedgerView) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn refresh(&mut self) -> Result<(), ManagerError> {
        let result = self.reload();
        self.report(result)
    }

    pub fn add(
        &mut self,
        amount: &str,
        description: &str,
        typ: TransactionType,
    ) -> Result<TransactionId, ManagerError> {
        let result = self.try_add(amount, description, typ);
        if result.is_ok() {
            self.form = Form::default();
        }
        self.report(result)
    }

    pub fn update(
        &mut self,
        id: &TransactionId,
        amount: &str,
        description: &str,
        typ: TransactionType,
    ) -> Result<(), ManagerError> {
        let result = self.try_update(id, amount, description, typ);
        if result.is_ok() {
            self.form = Form::default();
        }
        self.report(result)
    }

    /// Always permitted, whatever it does to the balance.
    pub fn delete(&mut self, id: &TransactionId) -> Result<(), ManagerError> {
        let result = self.try_delete(id);
        self.report(result)
    }

    /// Loads `id` into the form and switches it to editing. The record is not
    /// locked; another writer may still change it.
    pub fn begin_edit(&mut self, id: &TransactionId) -> Result<(), ManagerError> {
        let result = match self.view.find(id) {
            Some(tx) => {
                self.form = Form {
                    amount: tx.amount.to_string(),
                    description: tx.description.clone(),
                    typ: tx.typ,
                    mode: FormMode::Editing(id.clone()),
                };
                Ok(())
            }
            None => Err(ManagerError::NotFound(id.clone())),
        };
        self.report(result)
    }

    pub fn cancel_edit(&mut self) {
        self.form = Form::default();
        self.message = None;
    }

    /// Sends the form to `add` or `update` depending on its mode.
    pub fn submit(&mut self) -> Result<Option<TransactionId>, ManagerError> {
        let Form {
            amount,
            description,
            typ,
            mode,
        } = self.form.clone();

        match mode {
            FormMode::Idle => self.add(&amount, &description, typ).map(Some),
            FormMode::Editing(id) => self.update(&id, &amount, &description, typ).map(|_| None),
        }
    }

    fn reload(&mut self) -> Result<(), ManagerError> {
        let transactions = engine::sort_by_date_descending(self.store.list_all()?);
        let balance = engine::compute_balance(&transactions).map_err(LedgerError::from)?;
        log::debug!(
            "Refreshed ledger: {} transactions, balance {balance}",
            transactions.len()
        );

        self.view = LedgerView {
            transactions,
            balance,
        };
        for observer in self.observers.iter_mut() {
            observer(&self.view);
        }
        Ok(())
    }

    fn try_add(
        &mut self,
        amount: &str,
        description: &str,
        typ: TransactionType,
    ) -> Result<TransactionId, ManagerError> {
        if let FormMode::Editing(id) = &self.form.mode {
            return Err(ManagerError::EditInProgress(id.clone()));
        }

        let amount = parse_fields(amount, description)?;
        engine::validate_mutation(self.view.balance, typ, amount)?;

        let record = NewTransaction {
            amount,
            description: description.to_owned(),
            typ,
            date: Utc::now(),
        };
        log::debug!("Creating transaction: {record:?}");
        let id = self.store.create(record)?;
        log::info!("Added {typ} {amount} ({id})");

        self.reload()?;
        Ok(id)
    }

    fn try_update(
        &mut self,
        id: &TransactionId,
        amount: &str,
        description: &str,
        typ: TransactionType,
    ) -> Result<(), ManagerError> {
        let amount = parse_fields(amount, description)?;
        if self.view.find(id).is_none() {
            return Err(ManagerError::NotFound(id.clone()));
        }

        // The edited transaction's old value no longer counts once replaced
        let balance =
            engine::balance_excluding(&self.view.transactions, id).map_err(LedgerError::from)?;
        engine::validate_mutation(balance, typ, amount)?;

        let patch = TransactionPatch {
            amount,
            description: description.to_owned(),
            typ,
        };
        log::debug!("Updating transaction {id}: {patch:?}");
        self.store.update(id, patch)?;
        log::info!("Updated {id} to {typ} {amount}");

        self.reload()
    }

    fn try_delete(&mut self, id: &TransactionId) -> Result<(), ManagerError> {
        self.store.delete(id)?;
        log::info!("Deleted {id}");
        if self.form.mode == FormMode::Editing(id.clone()) {
            self.form = Form::default();
        }
        self.reload()
    }

    /// Replaces the message with the outcome of an operation.
    fn report<T>(&mut self, result: Result<T, ManagerError>) -> Result<T, ManagerError> {
        match &result {
            Ok(_) => self.message = None,
            Err(e) => {
                log::warn!("{e}");
                self.message = Some(e.to_string());
            }
        }
        result
    }
}

fn parse_fields(amount: &str, description: &str) -> Result<Amount, ManagerError> {
    if amount.trim().is_empty() {
        return Err(ManagerError::MissingField(Field::Amount));
    }
    if description.trim().is_empty() {
        return Err(ManagerError::MissingField(Field::Description));
    }
    Ok(amount.parse()?)
}
