//! Repository for the `tokens` table.
//!
//! Token creation is two sequential writes treated as one logical step:
//! [`TokenRepo::create`] inserts the pending row (the signature of the
//! credential binds the row id, so the row must exist first), then
//! [`TokenRepo::update_credentials`] persists the signed string and the
//! activation code. If the second write fails, the row exists but is
//! unusable -- the caller surfaces that as `TokenCreationFailed`.

use chrono::Utc;

use crate::models::token::Token;
use crate::DbPool;
use lattice_core::types::{DbId, Timestamp};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, token, database_name, is_active, \
    activation_code, activation_code_expires_at, created_at";

/// Provides CRUD operations for tokens.
pub struct TokenRepo;

impl TokenRepo {
    /// Insert a pending token row for `(user_id, database_name)`.
    ///
    /// The signed credential is empty at this point. A duplicate
    /// owner+database-name pair surfaces as a database unique-constraint
    /// error.
    pub async fn create(
        pool: &DbPool,
        user_id: DbId,
        database_name: &str,
    ) -> Result<Token, sqlx::Error> {
        let query = format!(
            "INSERT INTO tokens (user_id, database_name, created_at)
             VALUES (?1, ?2, ?3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Token>(&query)
            .bind(user_id)
            .bind(database_name)
            .bind(Utc::now())
            .fetch_one(pool)
            .await
    }

    /// Persist the signed credential and activation code for a freshly
    /// created token. Returns `true` if the row was updated.
    pub async fn update_credentials(
        pool: &DbPool,
        id: DbId,
        token: &str,
        activation_code: &str,
        expires_at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE tokens SET token = ?2, activation_code = ?3, \
             activation_code_expires_at = ?4 WHERE id = ?1",
        )
        .bind(id)
        .bind(token)
        .bind(activation_code)
        .bind(expires_at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Activate a token: set `is_active` and clear the code and its expiry.
    ///
    /// Returns `true` if the row was updated. The pending→active transition
    /// is terminal; there is no path back.
    pub async fn activate(pool: &DbPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE tokens SET is_active = 1, activation_code = NULL, \
             activation_code_expires_at = NULL WHERE id = ?1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find a token by internal ID.
    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<Token>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tokens WHERE id = ?1");
        sqlx::query_as::<_, Token>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a token by its exact signed credential string.
    pub async fn find_by_token(
        pool: &DbPool,
        token: &str,
    ) -> Result<Option<Token>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tokens WHERE token = ?1");
        sqlx::query_as::<_, Token>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// List all tokens owned by a user, in insertion order.
    pub async fn list_by_user(pool: &DbPool, user_id: DbId) -> Result<Vec<Token>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tokens WHERE user_id = ?1 ORDER BY id");
        sqlx::query_as::<_, Token>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
