//! Scope and kind classification of transactions.

use crate::model::project::ProjectId;
use crate::model::transaction::{Transaction, TransactionKind};
use serde::{Deserialize, Serialize};

/// Scope axis: portfolio-general or bound to one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "scope", content = "project")]
pub enum Scope {
    General,
    Project(ProjectId),
}

impl Scope {
    pub fn is_general(self) -> bool {
        matches!(self, Self::General)
    }

    pub fn project_id(self) -> Option<ProjectId> {
        match self {
            Self::General => None,
            Self::Project(id) => Some(id),
        }
    }
}

/// Both classification axes of one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Classification {
    pub scope: Scope,
    pub kind: TransactionKind,
}

/// Classifies a transaction. Pure: depends only on `project` and `kind`.
pub fn classify(transaction: &Transaction) -> Classification {
    Classification {
        scope: scope_of(transaction),
        kind: transaction.kind,
    }
}

pub fn scope_of(transaction: &Transaction) -> Scope {
    match transaction.project {
        Some(id) => Scope::Project(id),
        None => Scope::General,
    }
}

#[cfg(test)]
mod tests {
    use super::{classify, Scope};
    use crate::model::transaction::{Transaction, TransactionKind};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn entry(project: Option<Uuid>, kind: TransactionKind) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date"),
            kind,
            amount: Decimal::ONE_HUNDRED,
            note: String::new(),
            project,
        }
    }

    #[test]
    fn project_less_entries_are_general() {
        let classification = classify(&entry(None, TransactionKind::Expense));
        assert_eq!(classification.scope, Scope::General);
        assert_eq!(classification.kind, TransactionKind::Expense);
    }

    #[test]
    fn project_entries_keep_their_project_id() {
        let project = Uuid::new_v4();
        let classification = classify(&entry(Some(project), TransactionKind::Investment));
        assert_eq!(classification.scope, Scope::Project(project));
        assert_eq!(classification.scope.project_id(), Some(project));
        assert_eq!(classification.kind, TransactionKind::Investment);
    }

    #[test]
    fn classification_is_idempotent() {
        let transaction = entry(Some(Uuid::new_v4()), TransactionKind::Income);
        assert_eq!(classify(&transaction), classify(&transaction));
    }
}
