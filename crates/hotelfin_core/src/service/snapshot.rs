//! JSON backup snapshot of a ledger.
//!
//! # Invariants
//! - `version` is checked on load; newer snapshots are rejected.
//! - Every loaded record passes `validate()`; project references are not
//!   checked, so orphaned transactions survive a round trip.

use crate::model::project::{Project, ProjectValidationError};
use crate::model::transaction::{Transaction, TransactionValidationError};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Snapshot layout version written by this crate.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Full ledger contents in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: u32,
    pub projects: Vec<Project>,
    pub transactions: Vec<Transaction>,
}

impl LedgerSnapshot {
    pub fn new(projects: Vec<Project>, transactions: Vec<Transaction>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            projects,
            transactions,
        }
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self).map_err(SnapshotError::Json)
    }

    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(text).map_err(SnapshotError::Json)?;
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(snapshot.version));
        }
        for project in &snapshot.projects {
            project.validate().map_err(SnapshotError::InvalidProject)?;
        }
        for transaction in &snapshot.transactions {
            transaction
                .validate()
                .map_err(SnapshotError::InvalidTransaction)?;
        }
        Ok(snapshot)
    }
}

/// Snapshot encode/decode failures.
#[derive(Debug)]
pub enum SnapshotError {
    Json(serde_json::Error),
    UnsupportedVersion(u32),
    InvalidProject(ProjectValidationError),
    InvalidTransaction(TransactionValidationError),
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "snapshot json error: {err}"),
            Self::UnsupportedVersion(version) => write!(
                f,
                "snapshot version {version} is newer than supported {SNAPSHOT_VERSION}"
            ),
            Self::InvalidProject(err) => write!(f, "snapshot contains invalid project: {err}"),
            Self::InvalidTransaction(err) => {
                write!(f, "snapshot contains invalid transaction: {err}")
            }
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::UnsupportedVersion(_) => None,
            Self::InvalidProject(err) => Some(err),
            Self::InvalidTransaction(err) => Some(err),
        }
    }
}
