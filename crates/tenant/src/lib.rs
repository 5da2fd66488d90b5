//! Tenant Store: one isolated SQLite file per `(owner, database name)` pair.
//!
//! The store executes ad-hoc, client-supplied SQL against exactly one
//! tenant's file and maps every outcome into the shared
//! [`QueryEnvelope`](lattice_core::envelope::QueryEnvelope). It is
//! statement-agnostic: authorization lives with the caller, not with the
//! statement.

pub mod store;

pub use store::TenantStore;
