use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::engine::Amount;

/// Identifier handed out by the store when a transaction is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        TransactionId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    #[default]
    Income,
    Expense,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Income => f.write_str("Income"),
            TransactionType::Expense => f.write_str("Expense"),
        }
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(format!("unknown transaction type {other:?}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub amount: Amount,
    pub description: String,
    #[serde(rename = "type")]
    pub typ: TransactionType,
    pub date: DateTime<Utc>,
}

impl Transaction {
    /// Contribution of this transaction to the balance: positive for income,
    /// negative for expenses.
    pub fn signed_amount(&self) -> Result<Amount, crate::engine::AmountError> {
        match self.typ {
            TransactionType::Income => Ok(self.amount),
            TransactionType::Expense => Amount::ZERO.sub(&self.amount),
        }
    }
}

/// A transaction as handed to the store for creation; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub amount: Amount,
    pub description: String,
    #[serde(rename = "type")]
    pub typ: TransactionType,
    pub date: DateTime<Utc>,
}

impl NewTransaction {
    pub fn into_transaction(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            amount: self.amount,
            description: self.description,
            typ: self.typ,
            date: self.date,
        }
    }
}

/// Fields an update may change. Id and date are fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionPatch {
    pub amount: Amount,
    pub description: String,
    #[serde(rename = "type")]
    pub typ: TransactionType,
}

impl TransactionPatch {
    pub fn apply_to(self, tx: &mut Transaction) {
        tx.amount = self.amount;
        tx.description = self.description;
        tx.typ = self.typ;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_that_type_parses_case_insensitively() {
        assert_eq!("income".parse(), Ok(TransactionType::Income));
        assert_eq!(" Expense ".parse(), Ok(TransactionType::Expense));
        assert!("transfer".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_that_patch_keeps_id_and_date() {
        let date = "2024-03-01T10:00:00Z".parse().unwrap();
        let mut tx = NewTransaction {
            amount: Amount::from_units(10).unwrap(),
            description: "Coffee".into(),
            typ: TransactionType::Expense,
            date,
        }
        .into_transaction(TransactionId::new("abc"));

        TransactionPatch {
            amount: Amount::from_units(12).unwrap(),
            description: "Lunch".into(),
            typ: TransactionType::Income,
        }
        .apply_to(&mut tx);

        assert_eq!(tx.id.as_str(), "abc");
        assert_eq!(tx.date, date);
        assert_eq!(tx.description, "Lunch");
        assert_eq!(tx.typ, TransactionType::Income);
        assert_eq!(tx.signed_amount().unwrap(), Amount::from_units(12).unwrap());
    }

    #[test]
    fn test_that_transaction_serializes_with_type_field() {
        let tx = Transaction {
            id: TransactionId::new("t-1"),
            amount: Amount::from_units(5).unwrap(),
            description: "Book".into(),
            typ: TransactionType::Expense,
            date: "2024-01-02T03:04:05Z".parse().unwrap(),
        };

        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["id"], "t-1");
        assert_eq!(json["type"], "Expense");
        assert_eq!(json["amount"], "5.0000");
        assert_eq!(json["date"], "2024-01-02T03:04:05Z");
    }
}
