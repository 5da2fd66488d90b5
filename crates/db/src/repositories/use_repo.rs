//! Repository for the `uses` table (append-only audit log).

use chrono::Utc;

use crate::models::use_record::UseRecord;
use crate::DbPool;
use lattice_core::types::DbId;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, token_id, data, created_at";

/// Provides insert and query operations for audit records.
pub struct UseRepo;

impl UseRepo {
    /// Append one audit record for the token with the given credential
    /// string, resolving the token id through a join.
    ///
    /// Returns `false` when the credential matches no token (nothing to
    /// attach the record to). Audit logging is a side effect of the request,
    /// not part of its contract -- callers log a failure and move on rather
    /// than aborting the client-visible response.
    pub async fn insert(pool: &DbPool, token: &str, data: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO uses (token_id, data, created_at)
             SELECT id, ?2, ?3 FROM tokens WHERE token = ?1",
        )
        .bind(token)
        .bind(data)
        .bind(Utc::now())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List all audit records for a token, in insertion order.
    pub async fn list_by_token(
        pool: &DbPool,
        token_id: DbId,
    ) -> Result<Vec<UseRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM uses WHERE token_id = ?1 ORDER BY id");
        sqlx::query_as::<_, UseRecord>(&query)
            .bind(token_id)
            .fetch_all(pool)
            .await
    }

    /// Count audit records for a token.
    pub async fn count_by_token(pool: &DbPool, token_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM uses WHERE token_id = ?1")
            .bind(token_id)
            .fetch_one(pool)
            .await
    }
}
