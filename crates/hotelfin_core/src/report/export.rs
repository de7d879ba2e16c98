//! CSV rendering of report sections.
//!
//! # Responsibility
//! - Render caller-built sections into one delimited text document.
//! - Provide section builders for the standard portfolio report.
//!
//! # Invariants
//! - Every field is double-quoted, inner quotes doubled. No exceptions for
//!   titles, headers or numeric cells.
//! - Sections are emitted in caller order, separated by one blank line, each
//!   starting with its title line.
//! - Nothing here aggregates; callers pass pre-computed values.

use crate::model::transaction::format_date_key;
use crate::report::aggregate::{DayStats, Totals};
use crate::report::classify::Scope;
use crate::report::labels::ProjectDirectory;
use crate::report::ledger::LedgerRow;
use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::string::FromUtf8Error;

pub const TRANSACTION_LOG_TITLE: &str = "Transaction Log";
pub const PROJECT_SUMMARY_TITLE: &str = "Project Summary";
pub const PORTFOLIO_TOTAL_TITLE: &str = "Portfolio Total";
pub const DAILY_SUMMARY_TITLE: &str = "Daily Summary";

pub type ExportResult<T> = Result<T, ExportError>;

/// CSV rendering failures.
#[derive(Debug)]
pub enum ExportError {
    Csv(csv::Error),
    Io(std::io::Error),
    Utf8(FromUtf8Error),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv(err) => write!(f, "csv write failed: {err}"),
            Self::Io(err) => write!(f, "csv flush failed: {err}"),
            Self::Utf8(err) => write!(f, "csv output is not valid UTF-8: {err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Csv(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Utf8(err) => Some(err),
        }
    }
}

impl From<csv::Error> for ExportError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<std::io::Error> for ExportError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<FromUtf8Error> for ExportError {
    fn from(value: FromUtf8Error) -> Self {
        Self::Utf8(value)
    }
}

/// One titled table of the exported document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSection {
    pub title: String,
    /// Column schema; rendered as the header row.
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReportSection {
    pub fn new(title: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            title: title.into(),
            columns: columns.iter().map(|column| column.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }
}

/// Renders sections into one CSV document.
pub fn render_csv(sections: &[ReportSection]) -> ExportResult<String> {
    let mut buffer: Vec<u8> = Vec::new();

    for (index, section) in sections.iter().enumerate() {
        if index > 0 {
            buffer.push(b'\n');
        }
        write_section(&mut buffer, section)?;
    }

    Ok(String::from_utf8(buffer)?)
}

fn write_section(buffer: &mut Vec<u8>, section: &ReportSection) -> ExportResult<()> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(buffer);

    writer.write_record([section.title.as_str()])?;
    writer.write_record(&section.columns)?;
    for row in &section.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Ledger rows as they are displayed (newest first).
pub fn transaction_log_section(rows: &[LedgerRow], projects: &ProjectDirectory<'_>) -> ReportSection {
    let mut section = ReportSection::new(
        TRANSACTION_LOG_TITLE,
        &["Date", "Type", "Project", "Note", "Amount", "Running Balance"],
    );
    for row in rows {
        let transaction = &row.transaction;
        section.push_row(vec![
            transaction.date_key(),
            transaction.kind.as_str().to_string(),
            projects.label(transaction.project).to_string(),
            transaction.note.clone(),
            transaction.amount.to_string(),
            row.running_balance.to_string(),
        ]);
    }
    section
}

/// One row per scope, e.g. from `aggregate::by_scope`.
pub fn project_summary_section(
    scopes: &[(Scope, Totals)],
    projects: &ProjectDirectory<'_>,
) -> ReportSection {
    let mut section = ReportSection::new(
        PROJECT_SUMMARY_TITLE,
        &["Project", "Income", "Expense", "Investment", "Net"],
    );
    for (scope, totals) in scopes {
        let mut row = vec![projects.scope_label(*scope).to_string()];
        row.extend(totals_cells(totals));
        section.push_row(row);
    }
    section
}

pub fn portfolio_section(totals: &Totals) -> ReportSection {
    let mut section = ReportSection::new(
        PORTFOLIO_TOTAL_TITLE,
        &["Income", "Expense", "Investment", "Net"],
    );
    section.push_row(totals_cells(totals));
    section
}

pub fn day_stats_section(days: &BTreeMap<NaiveDate, DayStats>) -> ReportSection {
    let mut section = ReportSection::new(
        DAILY_SUMMARY_TITLE,
        &["Date", "Income", "Expense", "Investment", "General Net", "Entries"],
    );
    for (date, stats) in days {
        section.push_row(vec![
            format_date_key(*date),
            stats.income.to_string(),
            stats.expense.to_string(),
            stats.investment.to_string(),
            stats.general_net.to_string(),
            stats.transactions.len().to_string(),
        ]);
    }
    section
}

fn totals_cells(totals: &Totals) -> Vec<String> {
    vec![
        totals.income.to_string(),
        totals.expense.to_string(),
        totals.investment.to_string(),
        totals.net.to_string(),
    ]
}
