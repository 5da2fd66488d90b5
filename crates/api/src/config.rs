use crate::auth::credential::SigningConfig;
use crate::notify::smtp::SmtpConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the token signing secret have defaults suitable for
/// local development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Per-statement timeout for tenant query execution in seconds
    /// (default: `30`).
    pub statement_timeout_secs: u64,
    /// Catalog database URL (default: `sqlite://data/catalog.db`).
    pub catalog_url: String,
    /// Root directory for tenant database files (default: `data/tenants`).
    pub tenant_data_dir: String,
    /// Token credential signing configuration (secret).
    pub signing: SigningConfig,
    /// SMTP notifier configuration; `None` when `SMTP_HOST` is unset, in
    /// which case activation codes are only logged.
    pub smtp: Option<SmtpConfig>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                    |
    /// |---------------------------|----------------------------|
    /// | `HOST`                    | `0.0.0.0`                  |
    /// | `PORT`                    | `3000`                     |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                       |
    /// | `STATEMENT_TIMEOUT_SECS`  | `30`                       |
    /// | `CATALOG_DATABASE_URL`    | `sqlite://data/catalog.db` |
    /// | `TENANT_DATA_DIR`         | `data/tenants`             |
    ///
    /// Token signing (`TOKEN_SECRET_KEY`) and SMTP settings are loaded by
    /// [`SigningConfig::from_env`] and [`SmtpConfig::from_env`].
    ///
    /// # Panics
    ///
    /// Panics if `TOKEN_SECRET_KEY` is missing or a numeric variable does
    /// not parse; startup misconfiguration should fail fast.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let statement_timeout_secs: u64 = std::env::var("STATEMENT_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("STATEMENT_TIMEOUT_SECS must be a valid u64");

        let catalog_url = std::env::var("CATALOG_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://data/catalog.db".into());

        let tenant_data_dir =
            std::env::var("TENANT_DATA_DIR").unwrap_or_else(|_| "data/tenants".into());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            statement_timeout_secs,
            catalog_url,
            tenant_data_dir,
            signing: SigningConfig::from_env(),
            smtp: SmtpConfig::from_env(),
        }
    }
}
