use std::sync::Arc;

use crate::config::ServerConfig;
use crate::notify::Notifier;
use lattice_tenant::TenantStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Catalog database connection pool (single connection: catalog writers
    /// serialize process-wide through it).
    pub pool: lattice_db::DbPool,
    /// Per-tenant database files and statement execution.
    pub tenants: Arc<TenantStore>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Activation-code delivery collaborator.
    pub notifier: Arc<dyn Notifier>,
}
