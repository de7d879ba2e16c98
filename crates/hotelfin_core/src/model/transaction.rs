//! Transaction domain model.
//!
//! # Responsibility
//! - Define the canonical dated financial entry.
//! - Turn raw UI input (`TransactionDraft`) into validated records.
//! - Normalize accepted date spellings to one calendar-day key.
//!
//! # Invariants
//! - `amount > 0` for every committed transaction.
//! - `date` carries no time component.
//! - `kind` is always one of income/expense/investment once constructed.
//! - `project = None` means the entry is portfolio-general.

use crate::model::project::ProjectId;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a transaction.
pub type TransactionId = Uuid;

/// Canonical day-key layout (`YYYY-MM-DD`).
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Largest accepted single amount (10^15). Ledger sums of any realistic
/// length stay far below `Decimal::MAX`, so aggregation cannot overflow.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

const DATE_ONLY_FORMATS: &[&str] = &[DATE_KEY_FORMAT, "%Y/%m/%d", "%d.%m.%Y"];
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Kind axis of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Operating revenue.
    Income,
    /// Operating cost.
    Expense,
    /// Capital inflow. Never part of operational net.
    Investment,
}

impl TransactionKind {
    /// Stable string id used in storage and on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Investment => "investment",
        }
    }

    /// Parses a kind name, ignoring surrounding whitespace and ASCII case.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            "investment" => Some(Self::Investment),
            _ => None,
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical transaction record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    /// Calendar day; serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    /// Serialized as `type` to match external schema naming.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Decimal,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub project: Option<ProjectId>,
}

/// Raw creation input collected by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDraft {
    pub date: String,
    pub kind: String,
    pub amount: Decimal,
    pub note: String,
    pub project: Option<ProjectId>,
}

/// Partial in-place update. Only amount and note are mutable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionPatch {
    pub amount: Option<Decimal>,
    pub note: Option<String>,
}

impl Transaction {
    /// Validates a draft into a transaction with a generated id.
    ///
    /// # Errors
    /// - `InvalidDate` when the date matches no accepted spelling.
    /// - `UnknownKind` when the kind is not income/expense/investment.
    /// - `NonPositiveAmount` when `amount <= 0`.
    ///
    /// Project reference existence is checked by the store, not here.
    pub fn from_draft(draft: TransactionDraft) -> Result<Self, TransactionValidationError> {
        let date = parse_date_key(draft.date.as_str())?;
        let kind = TransactionKind::parse(draft.kind.as_str())
            .ok_or_else(|| TransactionValidationError::UnknownKind(draft.kind.clone()))?;

        let transaction = Self {
            id: Uuid::new_v4(),
            date,
            kind,
            amount: draft.amount,
            note: draft.note,
            project: draft.project,
        };
        transaction.validate()?;
        Ok(transaction)
    }

    /// Applies a patch and re-validates the result.
    pub fn apply_patch(&self, patch: TransactionPatch) -> Result<Self, TransactionValidationError> {
        let mut next = self.clone();
        if let Some(amount) = patch.amount {
            next.amount = amount;
        }
        if let Some(note) = patch.note {
            next.note = note;
        }
        next.validate()?;
        Ok(next)
    }

    /// Validates transaction invariants.
    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        if self.id.is_nil() {
            return Err(TransactionValidationError::NilId);
        }
        if self.amount <= Decimal::ZERO {
            return Err(TransactionValidationError::NonPositiveAmount(self.amount));
        }
        if self.amount > MAX_AMOUNT {
            return Err(TransactionValidationError::AmountTooLarge(self.amount));
        }
        Ok(())
    }

    /// Canonical `YYYY-MM-DD` key of `date`.
    pub fn date_key(&self) -> String {
        format_date_key(self.date)
    }
}

/// Parses any accepted date spelling into a calendar day.
///
/// Accepted: `YYYY-MM-DD`, `YYYY/MM/DD`, `DD.MM.YYYY`, RFC 3339 timestamps and
/// naive ISO timestamps. Time components are dropped.
pub fn parse_date_key(value: &str) -> Result<NaiveDate, TransactionValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TransactionValidationError::InvalidDate(value.to_string()));
    }

    for format in DATE_ONLY_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date);
        }
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(timestamp.date_naive());
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(timestamp.date());
        }
    }

    Err(TransactionValidationError::InvalidDate(value.to_string()))
}

/// Formats a calendar day as its canonical key.
pub fn format_date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Transaction invariant violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionValidationError {
    NilId,
    InvalidDate(String),
    UnknownKind(String),
    NonPositiveAmount(Decimal),
    AmountTooLarge(Decimal),
}

impl Display for TransactionValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "transaction id must not be nil"),
            Self::InvalidDate(value) => write!(f, "invalid transaction date `{value}`"),
            Self::UnknownKind(value) => write!(f, "unknown transaction type `{value}`"),
            Self::NonPositiveAmount(amount) => {
                write!(f, "transaction amount must be positive, got {amount}")
            }
            Self::AmountTooLarge(amount) => {
                write!(f, "transaction amount {amount} exceeds limit {MAX_AMOUNT}")
            }
        }
    }
}

impl Error for TransactionValidationError {}
