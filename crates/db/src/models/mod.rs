//! Catalog entity structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A `Serialize` response struct for external-facing output where the row
//!   carries material that must not leave the process (password hashes,
//!   activation codes)
//! - `Deserialize` DTOs for inserts

pub mod token;
pub mod use_record;
pub mod user;
