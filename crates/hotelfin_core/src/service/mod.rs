//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate access checks, validation and repository calls.
//! - Keep presentation callers decoupled from storage details.

pub mod ledger_store;
pub mod snapshot;
