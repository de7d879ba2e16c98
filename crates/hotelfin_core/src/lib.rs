//! Core ledger domain logic for hotel portfolio finance.
//! This crate is the single source of truth for ledger invariants.

pub mod access;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod report;
pub mod repo;
pub mod service;

pub use access::capability::{Permission, ResourceDomain};
pub use access::gate::{allow, Action, CapabilitySet};
pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::project::{Project, ProjectDraft, ProjectIcon, ProjectId, ProjectPatch};
pub use model::transaction::{
    Transaction, TransactionDraft, TransactionId, TransactionKind, TransactionPatch,
};
pub use report::aggregate::{by_day, by_project, by_scope, general, portfolio, DayStats, Totals};
pub use report::classify::{classify, Scope};
pub use report::filter::{ScopeFilter, TransactionFilter};
pub use report::ledger::{build_ledger, LedgerRow};
pub use repo::ledger_repo::{LedgerRepository, RepoError, RepoResult, SqliteLedgerRepository};
pub use repo::memory_repo::InMemoryLedgerRepository;
pub use service::ledger_store::{render_portfolio_report, LedgerStore, LedgerStoreError};
pub use service::snapshot::{LedgerSnapshot, SnapshotError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
