//! Day, project, scope and portfolio rollups.
//!
//! # Responsibility
//! - Fold an explicit transaction snapshot into summed totals.
//!
//! # Invariants
//! - Inputs are borrowed read-only; nothing here mutates or caches.
//! - `net` is always `income - expense`; investment never enters it.
//! - Empty input yields all-zero totals.
//! - Sums use `Decimal`, so per-scope nets add up to the portfolio net exactly.

use crate::model::project::ProjectId;
use crate::model::transaction::{format_date_key, Transaction, TransactionKind};
use crate::report::classify::{classify, Scope};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Summed amounts per kind plus operational net.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub income: Decimal,
    pub expense: Decimal,
    pub investment: Decimal,
    pub net: Decimal,
}

impl Totals {
    fn add(&mut self, transaction: &Transaction) {
        match transaction.kind {
            TransactionKind::Income => self.income += transaction.amount,
            TransactionKind::Expense => self.expense += transaction.amount,
            TransactionKind::Investment => self.investment += transaction.amount,
        }
        self.net = self.income - self.expense;
    }

    pub fn is_zero(&self) -> bool {
        self.income.is_zero()
            && self.expense.is_zero()
            && self.investment.is_zero()
            && self.net.is_zero()
    }
}

/// Calendar-day statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayStats {
    pub date: NaiveDate,
    pub income: Decimal,
    pub expense: Decimal,
    pub investment: Decimal,
    /// Signed sum of general-scope income/expense only.
    pub general_net: Decimal,
    /// Entries of this day in input order.
    pub transactions: Vec<Transaction>,
}

impl DayStats {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            income: Decimal::ZERO,
            expense: Decimal::ZERO,
            investment: Decimal::ZERO,
            general_net: Decimal::ZERO,
            transactions: Vec::new(),
        }
    }

    /// Canonical `YYYY-MM-DD` key of this bucket.
    pub fn date_key(&self) -> String {
        format_date_key(self.date)
    }
}

/// Groups transactions by calendar day.
pub fn by_day(transactions: &[Transaction]) -> BTreeMap<NaiveDate, DayStats> {
    let mut days: BTreeMap<NaiveDate, DayStats> = BTreeMap::new();

    for transaction in transactions {
        let stats = days
            .entry(transaction.date)
            .or_insert_with(|| DayStats::empty(transaction.date));
        let classification = classify(transaction);

        match classification.kind {
            TransactionKind::Income => {
                stats.income += transaction.amount;
                if classification.scope.is_general() {
                    stats.general_net += transaction.amount;
                }
            }
            TransactionKind::Expense => {
                stats.expense += transaction.amount;
                if classification.scope.is_general() {
                    stats.general_net -= transaction.amount;
                }
            }
            TransactionKind::Investment => stats.investment += transaction.amount,
        }
        stats.transactions.push(transaction.clone());
    }

    days
}

/// Totals of the transactions bound to `project_id`.
pub fn by_project(transactions: &[Transaction], project_id: ProjectId) -> Totals {
    totals_where(transactions, |scope| scope == Scope::Project(project_id))
}

/// Totals of project-less transactions.
pub fn general(transactions: &[Transaction]) -> Totals {
    totals_where(transactions, Scope::is_general)
}

/// Totals over every scope combined.
pub fn portfolio(transactions: &[Transaction]) -> Totals {
    totals_where(transactions, |_| true)
}

/// Totals per scope, ordered by first appearance in the input.
pub fn by_scope(transactions: &[Transaction]) -> Vec<(Scope, Totals)> {
    let mut rows: Vec<(Scope, Totals)> = Vec::new();

    for transaction in transactions {
        let scope = classify(transaction).scope;
        match rows.iter_mut().find(|(existing, _)| *existing == scope) {
            Some((_, totals)) => totals.add(transaction),
            None => {
                let mut totals = Totals::default();
                totals.add(transaction);
                rows.push((scope, totals));
            }
        }
    }

    rows
}

fn totals_where(transactions: &[Transaction], keep: impl Fn(Scope) -> bool) -> Totals {
    transactions
        .iter()
        .filter(|transaction| keep(classify(transaction).scope))
        .fold(Totals::default(), |mut totals, transaction| {
            totals.add(transaction);
            totals
        })
}
