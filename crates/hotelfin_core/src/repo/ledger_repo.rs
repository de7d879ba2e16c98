//! Ledger repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over projects and transactions behind one trait.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `validate()` before SQL mutations.
//! - `list_transactions` returns rows in insertion order.
//! - Project deletion removes the project and its transactions atomically.
//! - Read paths reject invalid persisted rows instead of masking them.

use crate::db::DbError;
use crate::model::project::{Project, ProjectIcon, ProjectId, ProjectValidationError};
use crate::model::transaction::{
    format_date_key, Transaction, TransactionId, TransactionKind, TransactionValidationError,
    DATE_KEY_FORMAT,
};
use chrono::NaiveDate;
use rusqlite::{ffi, params, Connection, ErrorCode, Row};
use rust_decimal::Decimal;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

const PROJECT_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    description,
    color,
    icon,
    created_at
FROM projects";

const TRANSACTION_SELECT_SQL: &str = "SELECT
    uuid,
    date,
    kind,
    amount,
    note,
    project_uuid
FROM transactions";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for ledger persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    InvalidProject(ProjectValidationError),
    InvalidTransaction(TransactionValidationError),
    Db(DbError),
    ProjectNotFound(ProjectId),
    TransactionNotFound(TransactionId),
    DuplicateId(Uuid),
    InvalidData(String),
    /// In-memory state lock was poisoned by a panicking writer.
    StatePoisoned,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidProject(err) => write!(f, "{err}"),
            Self::InvalidTransaction(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::TransactionNotFound(id) => write!(f, "transaction not found: {id}"),
            Self::DuplicateId(id) => write!(f, "record id already exists: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted ledger data: {message}"),
            Self::StatePoisoned => write!(f, "ledger state lock poisoned"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidProject(err) => Some(err),
            Self::InvalidTransaction(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ProjectValidationError> for RepoError {
    fn from(value: ProjectValidationError) -> Self {
        Self::InvalidProject(value)
    }
}

impl From<TransactionValidationError> for RepoError {
    fn from(value: TransactionValidationError) -> Self {
        Self::InvalidTransaction(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for the ledger entity store.
pub trait LedgerRepository {
    fn insert_project(&self, project: &Project) -> RepoResult<ProjectId>;
    fn update_project(&self, project: &Project) -> RepoResult<()>;
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    /// Projects in insertion order.
    fn list_projects(&self) -> RepoResult<Vec<Project>>;
    /// Deletes a project and every transaction referencing it.
    ///
    /// Returns the number of removed transactions.
    fn delete_project_cascade(&self, id: ProjectId) -> RepoResult<usize>;

    fn insert_transaction(&self, transaction: &Transaction) -> RepoResult<TransactionId>;
    fn update_transaction(&self, transaction: &Transaction) -> RepoResult<()>;
    fn get_transaction(&self, id: TransactionId) -> RepoResult<Option<Transaction>>;
    /// Transactions in insertion order.
    fn list_transactions(&self) -> RepoResult<Vec<Transaction>>;
    fn delete_transaction(&self, id: TransactionId) -> RepoResult<()>;
}

/// SQLite-backed ledger repository.
pub struct SqliteLedgerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLedgerRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl LedgerRepository for SqliteLedgerRepository<'_> {
    fn insert_project(&self, project: &Project) -> RepoResult<ProjectId> {
        project.validate()?;

        self.conn
            .execute(
                "INSERT INTO projects (uuid, name, description, color, icon, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    project.id.to_string(),
                    project.name.as_str(),
                    project.description.as_str(),
                    project.color.as_str(),
                    project.icon.as_str(),
                    project.created_at,
                ],
            )
            .map_err(|err| duplicate_or_db(err, project.id))?;

        Ok(project.id)
    }

    fn update_project(&self, project: &Project) -> RepoResult<()> {
        project.validate()?;

        let changed = self.conn.execute(
            "UPDATE projects
             SET name = ?1, description = ?2, color = ?3, icon = ?4
             WHERE uuid = ?5;",
            params![
                project.name.as_str(),
                project.description.as_str(),
                project.color.as_str(),
                project.icon.as_str(),
                project.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::ProjectNotFound(project.id));
        }
        Ok(())
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_project_row(row)?));
        }
        Ok(None)
    }

    fn list_projects(&self) -> RepoResult<Vec<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} ORDER BY seq ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }
        Ok(projects)
    }

    fn delete_project_cascade(&self, id: ProjectId) -> RepoResult<usize> {
        let tx = self.conn.unchecked_transaction()?;

        let removed_transactions = tx.execute(
            "DELETE FROM transactions WHERE project_uuid = ?1;",
            [id.to_string()],
        )?;
        let removed_projects = tx.execute("DELETE FROM projects WHERE uuid = ?1;", [id.to_string()])?;
        if removed_projects == 0 {
            // Dropping `tx` rolls back the transaction delete above.
            return Err(RepoError::ProjectNotFound(id));
        }

        tx.commit()?;
        Ok(removed_transactions)
    }

    fn insert_transaction(&self, transaction: &Transaction) -> RepoResult<TransactionId> {
        transaction.validate()?;

        self.conn
            .execute(
                "INSERT INTO transactions (uuid, date, kind, amount, note, project_uuid)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    transaction.id.to_string(),
                    format_date_key(transaction.date),
                    transaction.kind.as_str(),
                    transaction.amount.to_string(),
                    transaction.note.as_str(),
                    transaction.project.map(|id| id.to_string()),
                ],
            )
            .map_err(|err| duplicate_or_db(err, transaction.id))?;

        Ok(transaction.id)
    }

    fn update_transaction(&self, transaction: &Transaction) -> RepoResult<()> {
        transaction.validate()?;

        let changed = self.conn.execute(
            "UPDATE transactions
             SET date = ?1, kind = ?2, amount = ?3, note = ?4, project_uuid = ?5
             WHERE uuid = ?6;",
            params![
                format_date_key(transaction.date),
                transaction.kind.as_str(),
                transaction.amount.to_string(),
                transaction.note.as_str(),
                transaction.project.map(|id| id.to_string()),
                transaction.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::TransactionNotFound(transaction.id));
        }
        Ok(())
    }

    fn get_transaction(&self, id: TransactionId) -> RepoResult<Option<Transaction>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TRANSACTION_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_transaction_row(row)?));
        }
        Ok(None)
    }

    fn list_transactions(&self) -> RepoResult<Vec<Transaction>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TRANSACTION_SELECT_SQL} ORDER BY seq ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut transactions = Vec::new();
        while let Some(row) = rows.next()? {
            transactions.push(parse_transaction_row(row)?);
        }
        Ok(transactions)
    }

    fn delete_transaction(&self, id: TransactionId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM transactions WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::TransactionNotFound(id));
        }
        Ok(())
    }
}

/// Maps a `UNIQUE` violation to `DuplicateId`; other constraint failures
/// (`CHECK`, `NOT NULL`) stay database errors.
fn duplicate_or_db(err: rusqlite::Error, id: Uuid) -> RepoError {
    match err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            RepoError::DuplicateId(id)
        }
        other => other.into(),
    }
}

fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let uuid_text: String = row.get("uuid")?;
    let icon_text: String = row.get("icon")?;

    let project = Project {
        id: parse_uuid(&uuid_text, "projects.uuid")?,
        name: row.get("name")?,
        description: row.get("description")?,
        color: row.get("color")?,
        icon: ProjectIcon::from_name(&icon_text),
        created_at: row.get("created_at")?,
    };
    project.validate()?;
    Ok(project)
}

fn parse_transaction_row(row: &Row<'_>) -> RepoResult<Transaction> {
    let uuid_text: String = row.get("uuid")?;

    let date_text: String = row.get("date")?;
    let date = NaiveDate::parse_from_str(&date_text, DATE_KEY_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!("invalid date `{date_text}` in transactions.date"))
    })?;

    let kind_text: String = row.get("kind")?;
    let kind = TransactionKind::parse(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid kind `{kind_text}` in transactions.kind"))
    })?;

    let amount_text: String = row.get("amount")?;
    let amount = Decimal::from_str(&amount_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid amount `{amount_text}` in transactions.amount"
        ))
    })?;

    let project = match row.get::<_, Option<String>>("project_uuid")? {
        Some(value) => Some(parse_uuid(&value, "transactions.project_uuid")?),
        None => None,
    };

    let transaction = Transaction {
        id: parse_uuid(&uuid_text, "transactions.uuid")?,
        date,
        kind,
        amount,
        note: row.get("note")?,
        project,
    };
    transaction.validate()?;
    Ok(transaction)
}

#[cfg(test)]
mod tests {
    use super::{duplicate_or_db, LedgerRepository, RepoError, SqliteLedgerRepository};
    use crate::db::open_db_in_memory;
    use crate::model::transaction::{Transaction, TransactionKind};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    #[test]
    fn duplicate_uuid_maps_to_duplicate_id() {
        let conn = open_db_in_memory().expect("open db");
        let repo = SqliteLedgerRepository::new(&conn);
        let transaction = Transaction {
            id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 4, 1).expect("valid date"),
            kind: TransactionKind::Income,
            amount: Decimal::new(1250, 2),
            note: String::new(),
            project: None,
        };

        repo.insert_transaction(&transaction).expect("first insert");
        let err = repo
            .insert_transaction(&transaction)
            .expect_err("second insert");
        assert!(matches!(err, RepoError::DuplicateId(id) if id == transaction.id));
    }

    #[test]
    fn check_constraint_failure_stays_a_db_error() {
        let conn = open_db_in_memory().expect("open db");
        let err = conn
            .execute(
                "INSERT INTO transactions (uuid, date, kind, amount, note, project_uuid)
                 VALUES (?1, '2024-04-01', 'transfer', '5', '', NULL);",
                [Uuid::new_v4().to_string()],
            )
            .expect_err("kind CHECK must fail");

        let mapped = duplicate_or_db(err, Uuid::new_v4());
        assert!(matches!(mapped, RepoError::Db(_)));
    }
}
