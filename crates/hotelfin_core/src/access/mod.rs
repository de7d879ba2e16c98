//! Capability-based authorization for ledger mutations and gated views.
//!
//! The gate is decoupled from storage; `service::ledger_store` composes the
//! two so every mutation is checked before it reaches a repository.

pub mod capability;
pub mod gate;
