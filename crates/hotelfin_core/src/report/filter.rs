//! Transaction query applied before aggregation or ledger building.

use crate::model::project::ProjectId;
use crate::model::transaction::{Transaction, TransactionKind};
use crate::report::classify::{classify, Scope};
use chrono::NaiveDate;

/// Scope restriction of a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScopeFilter {
    #[default]
    Any,
    General,
    Project(ProjectId),
}

/// Caller-supplied query. Date bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub scope: ScopeFilter,
    pub kind: Option<TransactionKind>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl TransactionFilter {
    pub fn matches(&self, transaction: &Transaction) -> bool {
        let classification = classify(transaction);
        let scope_ok = match self.scope {
            ScopeFilter::Any => true,
            ScopeFilter::General => classification.scope == Scope::General,
            ScopeFilter::Project(id) => classification.scope == Scope::Project(id),
        };

        scope_ok
            && self.kind.map_or(true, |kind| kind == classification.kind)
            && self.from.map_or(true, |from| transaction.date >= from)
            && self.to.map_or(true, |to| transaction.date <= to)
    }

    /// Returns matching transactions in input order.
    pub fn apply(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        transactions
            .iter()
            .filter(|transaction| self.matches(transaction))
            .cloned()
            .collect()
    }
}
