//! Shared domain types for the Lattice platform.
//!
//! Everything here is pure data: type aliases, the error taxonomy, the
//! query response envelope, and database-name validation. No I/O.

pub mod envelope;
pub mod error;
pub mod naming;
pub mod types;
