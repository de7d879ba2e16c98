//! Repository layer for the ledger entity store.
//!
//! # Responsibility
//! - Define the storage contract the store is written against.
//! - Ship SQLite and in-memory persistence collaborators.
//!
//! # Invariants
//! - Repository writes enforce record `validate()` before persistence.
//! - Repository APIs return semantic errors (`*NotFound`, `DuplicateId`) in
//!   addition to transport errors.

pub mod ledger_repo;
pub mod memory_repo;
