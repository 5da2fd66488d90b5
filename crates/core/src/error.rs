//! Domain error taxonomy shared by the catalog, tenant, and gateway layers.

/// Domain-level failure kinds.
///
/// Auth and request errors short-circuit a gateway call before any tenant
/// I/O; storage errors from tenant statement execution are caught at the
/// store boundary and reported inside the response envelope, never as a
/// process-level fault.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// No token credential was supplied with the request.
    #[error("Missing token")]
    MissingToken,

    /// The supplied credential failed signature validation or matches no
    /// catalog row.
    #[error("Invalid token")]
    InvalidToken,

    /// The credential is well-formed but has not been activated yet.
    #[error("Token is not active")]
    TokenNotActive,

    /// No SQL statement was supplied with the request.
    #[error("Missing query")]
    MissingQuery,

    /// The database name is empty, too long, contains characters outside
    /// `[A-Za-z0-9_-]`, or would escape the tenant data root.
    #[error("Invalid database name: {0}")]
    InvalidDatabaseName(String),

    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// A uniqueness constraint was violated. The message is deliberately
    /// generic for user creation so the violated constraint is not leaked.
    #[error("{0}")]
    Conflict(String),

    /// The presented activation code does not match or has expired. The
    /// token stays pending.
    #[error("Invalid or expired activation code")]
    InvalidActivationCode,

    /// The token row was inserted but the signed credential or activation
    /// code could not be persisted. The row exists but is unusable.
    #[error("Token creation did not complete")]
    TokenCreationFailed,

    #[error("Update failed: {0}")]
    UpdateFailed(String),

    #[error("Storage error: {0}")]
    Storage(String),
}
