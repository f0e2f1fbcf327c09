use serde::{Deserialize, Deserializer, Serialize};

use crate::engine::{Transaction, TransactionType};

/// One row of an import file: `type,amount,description`.
///
/// Amount stays as text so that it goes through the same checks as a value
/// typed by hand.
#[derive(Deserialize, Debug, Clone)]
pub struct InputRecord {
    #[serde(rename = "type", deserialize_with = "type_from_text")]
    pub typ: TransactionType,
    pub amount: String,
    pub description: String,
}

fn type_from_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TransactionType, D::Error> {
    let text = String::deserialize(deserializer)?;
    text.parse().map_err(serde::de::Error::custom)
}

/// A row of the exported ledger.
/// It is used for decoupling the CSV layout from Transaction
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TransactionSnapshot {
    pub id: String,
    pub date: String,
    #[serde(rename = "type")]
    pub typ: String,
    pub amount: String,
    pub description: String,
}

impl From<&Transaction> for TransactionSnapshot {
    fn from(tx: &Transaction) -> Self {
        TransactionSnapshot {
            id: tx.id.to_string(),
            date: tx.date.to_rfc3339(),
            typ: tx.typ.to_string(),
            amount: tx.amount.to_string(),
            description: tx.description.clone(),
        }
    }
}
