//! Token entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;

use lattice_core::types::{DbId, Timestamp};

/// Full token row from the `tokens` table.
///
/// The activation code is an out-of-band secret delivered by the notifier;
/// use [`TokenResponse`] for external-facing output so it never rides along
/// in an API body.
#[derive(Debug, Clone, FromRow)]
pub struct Token {
    pub id: DbId,
    pub user_id: DbId,
    /// Signed credential bound to this row. Empty until the second creation
    /// step persists it; generated exactly once, never regenerated.
    pub token: String,
    pub database_name: String,
    pub is_active: bool,
    pub activation_code: Option<String>,
    pub activation_code_expires_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl Token {
    /// Whether the token is still awaiting activation.
    pub fn is_pending(&self) -> bool {
        !self.is_active
    }
}

/// Safe token representation for API responses (no activation code).
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub id: DbId,
    pub user_id: DbId,
    pub token: String,
    pub database_name: String,
    pub is_active: bool,
    pub created_at: Timestamp,
}

impl From<Token> for TokenResponse {
    fn from(token: Token) -> Self {
        Self {
            id: token.id,
            user_id: token.user_id,
            token: token.token,
            database_name: token.database_name,
            is_active: token.is_active,
            created_at: token.created_at,
        }
    }
}
