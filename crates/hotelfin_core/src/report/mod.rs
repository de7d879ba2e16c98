//! Pure reporting engine over transaction snapshots.
//!
//! # Responsibility
//! - Classify, filter, aggregate and order transactions for presentation.
//! - Render computed results as CSV text.
//!
//! # Invariants
//! - Every function takes an explicit borrowed snapshot; no global state.
//! - No function here performs I/O or mutates its input.
//! - Malformed-but-typed input never panics or errors; only CSV writing is
//!   fallible.

pub mod aggregate;
pub mod classify;
pub mod export;
pub mod filter;
pub mod labels;
pub mod ledger;
