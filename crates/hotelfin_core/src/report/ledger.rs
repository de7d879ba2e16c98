//! Chronological ledger with running operational balance.
//!
//! # Responsibility
//! - Order a transaction snapshot deterministically.
//! - Accumulate the running balance in true chronological order.
//! - Hand rows back newest-first for display.
//!
//! # Invariants
//! - Ties on `date` resolve by input position (insertion index), so repeated
//!   calls on the same input produce the same order.
//! - Display order is the exact reverse of the chronological pass.
//! - Investment rows carry the balance unchanged.
//! - The chronologically last balance equals `portfolio(input).net`.

use crate::model::transaction::{Transaction, TransactionKind};
use rust_decimal::Decimal;
use serde::Serialize;

/// One ledger line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerRow {
    pub transaction: Transaction,
    /// Position of the transaction in the builder input.
    pub insertion_index: usize,
    /// Operational balance after this row, computed oldest-first.
    pub running_balance: Decimal,
}

/// Builds the ledger in display order (newest first).
pub fn build_ledger(transactions: &[Transaction]) -> Vec<LedgerRow> {
    let mut rows = chronological_ledger(transactions);
    rows.reverse();
    rows
}

/// Builds the ledger in chronological order (oldest first).
pub fn chronological_ledger(transactions: &[Transaction]) -> Vec<LedgerRow> {
    let mut indexed: Vec<(usize, &Transaction)> = transactions.iter().enumerate().collect();
    indexed.sort_by(|(left_index, left), (right_index, right)| {
        left.date
            .cmp(&right.date)
            .then_with(|| left_index.cmp(right_index))
    });

    let mut balance = Decimal::ZERO;
    indexed
        .into_iter()
        .map(|(insertion_index, transaction)| {
            match transaction.kind {
                TransactionKind::Income => balance += transaction.amount,
                TransactionKind::Expense => balance -= transaction.amount,
                TransactionKind::Investment => {}
            }
            LedgerRow {
                transaction: transaction.clone(),
                insertion_index,
                running_balance: balance,
            }
        })
        .collect()
}

/// Balance of the chronologically last row of a display-ordered ledger.
pub fn closing_balance(display_rows: &[LedgerRow]) -> Decimal {
    display_rows
        .first()
        .map_or(Decimal::ZERO, |row| row.running_balance)
}
