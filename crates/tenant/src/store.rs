//! Per-tenant database files and ad-hoc statement execution.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row, SqlitePool, TypeInfo, ValueRef};
use tokio::sync::RwLock;

use lattice_core::envelope::{QueryEnvelope, RowMap};
use lattice_core::error::CoreError;
use lattice_core::naming::validate_database_name;
use lattice_core::types::DbId;

/// Upper bound on concurrently open tenant pools. When the cache is full,
/// an arbitrary idle pool is closed to make room; the file is reopened
/// lazily on the next statement.
const MAX_OPEN_TENANTS: usize = 64;

/// Executes statements against per-tenant SQLite files under a fixed root.
///
/// Each tenant file is served by a pool capped at a single connection, so
/// statements against the same file serialize while distinct tenants (and
/// the catalog) proceed fully in parallel.
pub struct TenantStore {
    root: PathBuf,
    statement_timeout: Duration,
    pools: RwLock<HashMap<(DbId, String), SqlitePool>>,
}

impl TenantStore {
    /// Create a store rooted at `root`. The directory is created lazily as
    /// tenant files are opened.
    pub fn new(root: impl Into<PathBuf>, statement_timeout: Duration) -> Self {
        Self {
            root: root.into(),
            statement_timeout,
            pools: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve the database file path for `(owner, database_name)`.
    ///
    /// The name must pass [`validate_database_name`] and the joined path
    /// must stay under the store root. Containment is a required invariant:
    /// traversal input is rejected, never normalized into an escape.
    pub fn resolve_path(&self, owner: DbId, database_name: &str) -> Result<PathBuf, CoreError> {
        validate_database_name(database_name)?;

        let path = self
            .root
            .join(owner.to_string())
            .join(format!("{database_name}.db"));

        if !path.starts_with(&self.root) || has_parent_component(&path) {
            return Err(CoreError::InvalidDatabaseName(database_name.to_string()));
        }
        Ok(path)
    }

    /// Execute one statement against the tenant's database and wrap the
    /// outcome in an envelope.
    ///
    /// This never returns an error: path rejections, engine failures, and
    /// timeouts all become a 400 envelope whose `error_message` carries the
    /// underlying message. Read statements populate `results`; INSERTs
    /// report the last inserted rowid; everything else returns neither.
    pub async fn execute(&self, owner: DbId, database_name: &str, sql: &str) -> QueryEnvelope {
        let pool = match self.pool_for(owner, database_name).await {
            Ok(pool) => pool,
            Err(err) => return QueryEnvelope::bad(sql, err.to_string()),
        };

        match tokio::time::timeout(self.statement_timeout, run_statement(&pool, sql)).await {
            Ok(Ok(envelope)) => envelope,
            Ok(Err(err)) => QueryEnvelope::bad(sql, engine_message(&err)),
            Err(_) => QueryEnvelope::bad(
                sql,
                format!(
                    "statement timed out after {}s",
                    self.statement_timeout.as_secs()
                ),
            ),
        }
    }

    /// Get or lazily open the single-connection pool for a tenant file.
    async fn pool_for(&self, owner: DbId, database_name: &str) -> Result<SqlitePool, CoreError> {
        let key = (owner, database_name.to_string());

        {
            let pools = self.pools.read().await;
            if let Some(pool) = pools.get(&key) {
                return Ok(pool.clone());
            }
        }

        let path = self.resolve_path(owner, database_name)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CoreError::Storage(e.to_string()))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| CoreError::Storage(e.to_string()))?;

        let mut pools = self.pools.write().await;
        if let Some(existing) = pools.get(&key) {
            // Lost the open race; keep the pool that is already shared.
            let existing = existing.clone();
            pool.close().await;
            return Ok(existing);
        }

        if pools.len() >= MAX_OPEN_TENANTS {
            if let Some(evict) = pools.keys().next().cloned() {
                if let Some(old) = pools.remove(&evict) {
                    tracing::debug!(owner = evict.0, database = %evict.1, "Evicting idle tenant pool");
                    old.close().await;
                }
            }
        }

        tracing::debug!(owner, database = %database_name, path = %path.display(), "Opened tenant database");
        pools.insert(key, pool.clone());
        Ok(pool)
    }
}

/// Statement shape for response construction. This is not validation: the
/// statement is passed to the engine verbatim either way.
enum StatementKind {
    Read,
    Insert,
    Other,
}

fn statement_kind(sql: &str) -> StatementKind {
    let first = sql
        .trim_start()
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_ascii_uppercase();
    match first.as_str() {
        "SELECT" | "WITH" | "PRAGMA" | "EXPLAIN" | "VALUES" => StatementKind::Read,
        "INSERT" | "REPLACE" => StatementKind::Insert,
        _ => StatementKind::Other,
    }
}

async fn run_statement(pool: &SqlitePool, sql: &str) -> Result<QueryEnvelope, sqlx::Error> {
    match statement_kind(sql) {
        StatementKind::Read => {
            let rows = sqlx::raw_sql(sql).fetch_all(pool).await?;
            let results = rows
                .iter()
                .map(row_to_map)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(QueryEnvelope::good(sql, Some(results), None))
        }
        StatementKind::Insert => {
            let result = sqlx::raw_sql(sql).execute(pool).await?;
            Ok(QueryEnvelope::good(
                sql,
                None,
                Some(result.last_insert_rowid()),
            ))
        }
        StatementKind::Other => {
            sqlx::raw_sql(sql).execute(pool).await?;
            Ok(QueryEnvelope::good(sql, None, None))
        }
    }
}

/// Convert one result row into an ordered column→JSON map.
fn row_to_map(row: &SqliteRow) -> Result<RowMap, sqlx::Error> {
    let mut map = RowMap::new();
    for column in row.columns() {
        let value = column_value(row, column.ordinal())?;
        map.insert(column.name().to_string(), value);
    }
    Ok(map)
}

/// Decode a single column by its SQLite storage class. The schema is owner
/// defined and unknown here, so decoding follows the value, not a model:
/// integers and booleans as i64, reals as f64, blobs as base64 text, and
/// everything textual as a string.
fn column_value(row: &SqliteRow, idx: usize) -> Result<serde_json::Value, sqlx::Error> {
    let raw = row.try_get_raw(idx)?;
    if raw.is_null() {
        return Ok(serde_json::Value::Null);
    }
    let type_name = raw.type_info().name().to_ascii_uppercase();

    let value = match type_name.as_str() {
        "INTEGER" | "BOOLEAN" => serde_json::Value::from(row.try_get::<i64, _>(idx)?),
        "REAL" => serde_json::Value::from(row.try_get::<f64, _>(idx)?),
        "BLOB" => serde_json::Value::String(BASE64.encode(row.try_get::<Vec<u8>, _>(idx)?)),
        _ => serde_json::Value::String(row.try_get::<String, _>(idx)?),
    };
    Ok(value)
}

/// Extract the engine's own message from a sqlx error, so the envelope
/// reports `near "SELEKT": syntax error` rather than a wrapper string.
fn engine_message(err: &sqlx::Error) -> String {
    match err {
        sqlx::Error::Database(db_err) => db_err.message().to_string(),
        other => other.to_string(),
    }
}

fn has_parent_component(path: &Path) -> bool {
    path.components().any(|c| matches!(c, Component::ParentDir))
}
