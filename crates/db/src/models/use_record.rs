//! Use (audit) entity model.
//!
//! A Use is one append-only audit record per authenticated gateway call
//! that reached statement execution. Rows are immutable once written: there
//! is no update DTO and no delete operation.

use serde::Serialize;
use sqlx::FromRow;

use lattice_core::types::{DbId, Timestamp};

/// A row from the `uses` table. `data` is the serialized response envelope
/// of the audited call, failures included.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UseRecord {
    pub id: DbId,
    pub token_id: DbId,
    pub data: String,
    pub created_at: Timestamp,
}
