//! In-memory ledger repository.
//!
//! # Invariants
//! - All reads and writes go through one `Mutex`, so mutations on a ledger
//!   are serialized and every read observes a consistent snapshot.
//! - Vectors keep insertion order; updates replace records in place.

use crate::model::project::{Project, ProjectId};
use crate::model::transaction::{Transaction, TransactionId};
use crate::repo::ledger_repo::{LedgerRepository, RepoError, RepoResult};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct LedgerState {
    projects: Vec<Project>,
    transactions: Vec<Transaction>,
}

/// Process-local repository, used by tests and snapshot-backed callers.
#[derive(Debug, Default)]
pub struct InMemoryLedgerRepository {
    state: Mutex<LedgerState>,
}

impl InMemoryLedgerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a repository from existing records without reference checks.
    ///
    /// Records still have to pass `validate()`.
    pub fn from_records(
        projects: Vec<Project>,
        transactions: Vec<Transaction>,
    ) -> RepoResult<Self> {
        for project in &projects {
            project.validate()?;
        }
        for transaction in &transactions {
            transaction.validate()?;
        }
        Ok(Self {
            state: Mutex::new(LedgerState {
                projects,
                transactions,
            }),
        })
    }

    fn lock(&self) -> RepoResult<MutexGuard<'_, LedgerState>> {
        self.state.lock().map_err(|_| RepoError::StatePoisoned)
    }
}

impl LedgerRepository for InMemoryLedgerRepository {
    fn insert_project(&self, project: &Project) -> RepoResult<ProjectId> {
        project.validate()?;
        let mut state = self.lock()?;
        if state.projects.iter().any(|existing| existing.id == project.id) {
            return Err(RepoError::DuplicateId(project.id));
        }
        state.projects.push(project.clone());
        Ok(project.id)
    }

    fn update_project(&self, project: &Project) -> RepoResult<()> {
        project.validate()?;
        let mut state = self.lock()?;
        let slot = state
            .projects
            .iter_mut()
            .find(|existing| existing.id == project.id)
            .ok_or(RepoError::ProjectNotFound(project.id))?;
        *slot = project.clone();
        Ok(())
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let state = self.lock()?;
        Ok(state.projects.iter().find(|project| project.id == id).cloned())
    }

    fn list_projects(&self) -> RepoResult<Vec<Project>> {
        Ok(self.lock()?.projects.clone())
    }

    fn delete_project_cascade(&self, id: ProjectId) -> RepoResult<usize> {
        let mut state = self.lock()?;
        let before = state.projects.len();
        state.projects.retain(|project| project.id != id);
        if state.projects.len() == before {
            return Err(RepoError::ProjectNotFound(id));
        }

        let before = state.transactions.len();
        state
            .transactions
            .retain(|transaction| transaction.project != Some(id));
        Ok(before - state.transactions.len())
    }

    fn insert_transaction(&self, transaction: &Transaction) -> RepoResult<TransactionId> {
        transaction.validate()?;
        let mut state = self.lock()?;
        if state
            .transactions
            .iter()
            .any(|existing| existing.id == transaction.id)
        {
            return Err(RepoError::DuplicateId(transaction.id));
        }
        state.transactions.push(transaction.clone());
        Ok(transaction.id)
    }

    fn update_transaction(&self, transaction: &Transaction) -> RepoResult<()> {
        transaction.validate()?;
        let mut state = self.lock()?;
        let slot = state
            .transactions
            .iter_mut()
            .find(|existing| existing.id == transaction.id)
            .ok_or(RepoError::TransactionNotFound(transaction.id))?;
        *slot = transaction.clone();
        Ok(())
    }

    fn get_transaction(&self, id: TransactionId) -> RepoResult<Option<Transaction>> {
        let state = self.lock()?;
        Ok(state
            .transactions
            .iter()
            .find(|transaction| transaction.id == id)
            .cloned())
    }

    fn list_transactions(&self) -> RepoResult<Vec<Transaction>> {
        Ok(self.lock()?.transactions.clone())
    }

    fn delete_transaction(&self, id: TransactionId) -> RepoResult<()> {
        let mut state = self.lock()?;
        let before = state.transactions.len();
        state.transactions.retain(|transaction| transaction.id != id);
        if state.transactions.len() == before {
            return Err(RepoError::TransactionNotFound(id));
        }
        Ok(())
    }
}
