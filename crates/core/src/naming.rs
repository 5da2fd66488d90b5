//! Validation for tenant database names.
//!
//! A database name becomes part of a filesystem path under the tenant data
//! root, so the charset is restricted up front. Containment under the root
//! is still re-checked at path-resolution time; this validation exists so a
//! hostile name is rejected before it ever reaches the filesystem layer.

use crate::error::CoreError;

/// Maximum length of a tenant database name.
pub const MAX_DATABASE_NAME_LEN: usize = 64;

/// Validate a tenant database name.
///
/// Accepts 1..=64 characters from `[A-Za-z0-9_-]`. Everything else —
/// separators, dots, traversal sequences, whitespace, empty input — is
/// rejected with [`CoreError::InvalidDatabaseName`].
pub fn validate_database_name(name: &str) -> Result<(), CoreError> {
    if name.is_empty() {
        return Err(CoreError::InvalidDatabaseName("name is empty".into()));
    }
    if name.len() > MAX_DATABASE_NAME_LEN {
        return Err(CoreError::InvalidDatabaseName(format!(
            "name exceeds {MAX_DATABASE_NAME_LEN} characters"
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(CoreError::InvalidDatabaseName(format!(
            "'{name}' contains characters outside [A-Za-z0-9_-]"
        )));
    }
    Ok(())
}
