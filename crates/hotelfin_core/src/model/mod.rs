//! Domain model for the portfolio ledger.
//!
//! # Responsibility
//! - Define canonical project and transaction records.
//! - Own validation of raw UI input before it reaches storage.
//!
//! # Invariants
//! - Every record is identified by a stable, non-nil `Uuid`.
//! - Aggregation code may assume every stored record passed `validate()`.

pub mod project;
pub mod transaction;
