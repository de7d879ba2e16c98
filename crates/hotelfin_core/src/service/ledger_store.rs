//! Ledger entity store use-case service.
//!
//! # Responsibility
//! - Be the single owner of projects and transactions.
//! - Validate raw input at the mutation boundary.
//! - Run the access gate before any mutation reaches the repository.
//! - Compose snapshot reads into gated reports and backups.
//!
//! # Invariants
//! - No repository write happens unless `allow()` returned true first.
//! - New transactions may only reference projects that exist at creation.
//! - Deleting a project removes every transaction referencing it.
//! - Gated mutations on one store run one at a time; a read-then-write
//!   sequence never interleaves with another mutation.
//! - Log events carry ids and counts only, never notes or amounts.

use crate::access::gate::{allow, Action, CapabilitySet};
use crate::model::project::{Project, ProjectDraft, ProjectId, ProjectPatch, ProjectValidationError};
use crate::model::transaction::{
    Transaction, TransactionDraft, TransactionId, TransactionPatch, TransactionValidationError,
};
use crate::report::aggregate::{by_scope, portfolio};
use crate::report::export::{
    portfolio_section, project_summary_section, render_csv, transaction_log_section, ExportError,
};
use crate::report::filter::TransactionFilter;
use crate::report::labels::ProjectDirectory;
use crate::report::ledger::build_ledger;
use crate::repo::ledger_repo::{LedgerRepository, RepoError};
use crate::service::snapshot::{LedgerSnapshot, SnapshotError};
use chrono::Utc;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, MutexGuard};

pub type StoreResult<T> = Result<T, LedgerStoreError>;

/// Errors from ledger store operations.
#[derive(Debug)]
pub enum LedgerStoreError {
    /// The access gate denied the action; nothing was written.
    Forbidden(Action),
    InvalidProject(ProjectValidationError),
    InvalidTransaction(TransactionValidationError),
    ProjectNotFound(ProjectId),
    TransactionNotFound(TransactionId),
    /// New transaction references a project that does not exist.
    UnknownProjectReference(ProjectId),
    Repo(RepoError),
    Export(ExportError),
    Snapshot(SnapshotError),
}

impl Display for LedgerStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forbidden(action) => write!(f, "action not permitted: {action}"),
            Self::InvalidProject(err) => write!(f, "{err}"),
            Self::InvalidTransaction(err) => write!(f, "{err}"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::TransactionNotFound(id) => write!(f, "transaction not found: {id}"),
            Self::UnknownProjectReference(id) => {
                write!(f, "transaction references unknown project: {id}")
            }
            Self::Repo(err) => write!(f, "{err}"),
            Self::Export(err) => write!(f, "{err}"),
            Self::Snapshot(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LedgerStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidProject(err) => Some(err),
            Self::InvalidTransaction(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Export(err) => Some(err),
            Self::Snapshot(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for LedgerStoreError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::ProjectNotFound(id) => Self::ProjectNotFound(id),
            RepoError::TransactionNotFound(id) => Self::TransactionNotFound(id),
            RepoError::InvalidProject(err) => Self::InvalidProject(err),
            RepoError::InvalidTransaction(err) => Self::InvalidTransaction(err),
            other => Self::Repo(other),
        }
    }
}

impl From<ProjectValidationError> for LedgerStoreError {
    fn from(value: ProjectValidationError) -> Self {
        Self::InvalidProject(value)
    }
}

impl From<TransactionValidationError> for LedgerStoreError {
    fn from(value: TransactionValidationError) -> Self {
        Self::InvalidTransaction(value)
    }
}

impl From<ExportError> for LedgerStoreError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

impl From<SnapshotError> for LedgerStoreError {
    fn from(value: SnapshotError) -> Self {
        Self::Snapshot(value)
    }
}

/// Entity store facade over a repository implementation.
pub struct LedgerStore<R: LedgerRepository> {
    repo: R,
    mutation_lock: Mutex<()>,
}

impl<R: LedgerRepository> LedgerStore<R> {
    /// Creates a store owning the provided repository.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            mutation_lock: Mutex::new(()),
        }
    }

    fn begin_mutation(&self) -> StoreResult<MutexGuard<'_, ()>> {
        self.mutation_lock
            .lock()
            .map_err(|_| LedgerStoreError::Repo(RepoError::StatePoisoned))
    }

    /// Creates one project from a draft.
    pub fn create_project(
        &self,
        capabilities: &CapabilitySet,
        draft: ProjectDraft,
    ) -> StoreResult<Project> {
        authorize(capabilities, Action::CreateProject)?;
        let _guard = self.begin_mutation()?;

        let project = Project::from_draft(draft, Utc::now().timestamp_millis())?;
        self.repo.insert_project(&project)?;
        info!(
            "event=project_create module=store status=ok project_id={}",
            project.id
        );
        Ok(project)
    }

    /// Applies an in-place patch to one project.
    pub fn update_project(
        &self,
        capabilities: &CapabilitySet,
        id: ProjectId,
        patch: ProjectPatch,
    ) -> StoreResult<Project> {
        authorize(capabilities, Action::UpdateProject)?;
        let _guard = self.begin_mutation()?;

        let current = self
            .repo
            .get_project(id)?
            .ok_or(LedgerStoreError::ProjectNotFound(id))?;
        let updated = current.apply_patch(patch)?;
        self.repo.update_project(&updated)?;
        info!("event=project_update module=store status=ok project_id={id}");
        Ok(updated)
    }

    /// Deletes one project and its transactions.
    ///
    /// Returns the number of cascaded transaction deletions.
    pub fn delete_project(&self, capabilities: &CapabilitySet, id: ProjectId) -> StoreResult<usize> {
        authorize(capabilities, Action::DeleteProject)?;
        let _guard = self.begin_mutation()?;

        let removed = self.repo.delete_project_cascade(id)?;
        info!(
            "event=project_delete module=store status=ok project_id={id} cascaded_transactions={removed}"
        );
        Ok(removed)
    }

    /// Validates a draft and records it as a new transaction.
    pub fn create_transaction(
        &self,
        capabilities: &CapabilitySet,
        draft: TransactionDraft,
    ) -> StoreResult<Transaction> {
        authorize(capabilities, Action::CreateTransaction)?;
        let _guard = self.begin_mutation()?;

        let transaction = Transaction::from_draft(draft)?;
        if let Some(project_id) = transaction.project {
            if self.repo.get_project(project_id)?.is_none() {
                return Err(LedgerStoreError::UnknownProjectReference(project_id));
            }
        }
        self.repo.insert_transaction(&transaction)?;
        info!(
            "event=transaction_create module=store status=ok transaction_id={} kind={}",
            transaction.id, transaction.kind
        );
        Ok(transaction)
    }

    /// Applies an amount/note patch to one transaction.
    pub fn update_transaction(
        &self,
        capabilities: &CapabilitySet,
        id: TransactionId,
        patch: TransactionPatch,
    ) -> StoreResult<Transaction> {
        authorize(capabilities, Action::UpdateTransaction)?;
        let _guard = self.begin_mutation()?;

        let current = self
            .repo
            .get_transaction(id)?
            .ok_or(LedgerStoreError::TransactionNotFound(id))?;
        let updated = current.apply_patch(patch)?;
        self.repo.update_transaction(&updated)?;
        info!("event=transaction_update module=store status=ok transaction_id={id}");
        Ok(updated)
    }

    pub fn delete_transaction(
        &self,
        capabilities: &CapabilitySet,
        id: TransactionId,
    ) -> StoreResult<()> {
        authorize(capabilities, Action::DeleteTransaction)?;
        let _guard = self.begin_mutation()?;

        self.repo.delete_transaction(id)?;
        info!("event=transaction_delete module=store status=ok transaction_id={id}");
        Ok(())
    }

    pub fn get_project(&self, id: ProjectId) -> StoreResult<Option<Project>> {
        Ok(self.repo.get_project(id)?)
    }

    pub fn list_projects(&self) -> StoreResult<Vec<Project>> {
        Ok(self.repo.list_projects()?)
    }

    pub fn get_transaction(&self, id: TransactionId) -> StoreResult<Option<Transaction>> {
        Ok(self.repo.get_transaction(id)?)
    }

    /// Transactions in insertion order.
    pub fn list_transactions(&self) -> StoreResult<Vec<Transaction>> {
        Ok(self.repo.list_transactions()?)
    }

    /// Read-only copy of the whole ledger.
    pub fn snapshot(&self) -> StoreResult<LedgerSnapshot> {
        Ok(LedgerSnapshot::new(
            self.repo.list_projects()?,
            self.repo.list_transactions()?,
        ))
    }

    /// Serializes the whole ledger as a JSON backup.
    pub fn backup(&self, capabilities: &CapabilitySet) -> StoreResult<String> {
        authorize(capabilities, Action::TakeBackup)?;

        let snapshot = self.snapshot()?;
        let json = snapshot.to_json()?;
        info!(
            "event=backup module=store status=ok projects={} transactions={}",
            snapshot.projects.len(),
            snapshot.transactions.len()
        );
        Ok(json)
    }

    /// Renders the standard CSV report for the filtered transaction set.
    ///
    /// Sections: transaction log (newest first), per-project summary,
    /// portfolio total.
    pub fn export_report_csv(
        &self,
        capabilities: &CapabilitySet,
        filter: &TransactionFilter,
    ) -> StoreResult<String> {
        authorize(capabilities, Action::ViewReports)?;

        let snapshot = self.snapshot()?;
        let csv = render_portfolio_report(&snapshot, filter)?;
        info!("event=report_export module=store status=ok bytes={}", csv.len());
        Ok(csv)
    }
}

/// Builds the standard CSV report from a snapshot without any gate check.
///
/// Used by callers that already hold a snapshot (CLI, exports of backups).
pub fn render_portfolio_report(
    snapshot: &LedgerSnapshot,
    filter: &TransactionFilter,
) -> Result<String, ExportError> {
    let transactions = filter.apply(&snapshot.transactions);
    let directory = ProjectDirectory::new(&snapshot.projects);

    render_csv(&[
        transaction_log_section(&build_ledger(&transactions), &directory),
        project_summary_section(&by_scope(&transactions), &directory),
        portfolio_section(&portfolio(&transactions)),
    ])
}

fn authorize(capabilities: &CapabilitySet, action: Action) -> StoreResult<()> {
    if allow(capabilities, action) {
        return Ok(());
    }
    warn!(
        "event=access_denied module=store status=denied action={}",
        action.as_str()
    );
    Err(LedgerStoreError::Forbidden(action))
}
