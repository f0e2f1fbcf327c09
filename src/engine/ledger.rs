use crate::engine::{Amount, AmountError, Transaction, TransactionId, TransactionType};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Cannot credit 0 amount")]
    ZeroAmount,

    #[error("Amount must be positive, got {0}")]
    NegativeAmount(Amount),

    #[error("Insufficient balance for this expense: balance is {balance}, expense is {amount}")]
    InsufficientBalance { balance: Amount, amount: Amount },

    #[error("Balance computation failed: {0}")]
    Amount(#[from] AmountError),
}

/// Income adds, expense subtracts. The order of `transactions` does not matter.
pub fn compute_balance<'a, I>(transactions: I) -> Result<Amount, AmountError>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    transactions
        .into_iter()
        .try_fold(Amount::ZERO, |acc, tx| acc.add(&tx.signed_amount()?))
}

/// Balance of every transaction except `id`, i.e. the balance an edit of `id`
/// is validated against.
pub fn balance_excluding(
    transactions: &[Transaction],
    id: &TransactionId,
) -> Result<Amount, AmountError> {
    compute_balance(transactions.iter().filter(|tx| &tx.id != id))
}

/// Most recent first. Transactions with the same date keep their relative order.
pub fn sort_by_date_descending(mut transactions: Vec<Transaction>) -> Vec<Transaction> {
    // sort_by is stable
    transactions.sort_by(|a, b| b.date.cmp(&a.date));
    transactions
}

pub fn validate_mutation(
    existing_balance: Amount,
    proposed_type: TransactionType,
    proposed_amount: Amount,
) -> Result<(), LedgerError> {
    if proposed_amount.is_zero() {
        return Err(LedgerError::ZeroAmount);
    }
    if proposed_amount.is_negative() {
        return Err(LedgerError::NegativeAmount(proposed_amount));
    }
    if proposed_type == TransactionType::Expense && proposed_amount > existing_balance {
        return Err(LedgerError::InsufficientBalance {
            balance: existing_balance,
            amount: proposed_amount,
        });
    }
    Ok(())
}
