use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lattice_api::config::ServerConfig;
use lattice_api::notify::smtp::SmtpNotifier;
use lattice_api::notify::{LogNotifier, Notifier};
use lattice_api::{routes, state::AppState};
use lattice_tenant::TenantStore;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lattice_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Data directories ---
    prepare_catalog_dir(&config.catalog_url);
    std::fs::create_dir_all(&config.tenant_data_dir)
        .expect("Failed to create tenant data directory");

    // --- Catalog database ---
    let pool = lattice_db::create_pool(&config.catalog_url)
        .await
        .expect("Failed to open catalog database");
    tracing::info!("Catalog connection pool created");

    lattice_db::health_check(&pool)
        .await
        .expect("Catalog health check failed");

    lattice_db::run_migrations(&pool)
        .await
        .expect("Failed to run catalog migrations");
    tracing::info!("Catalog migrations applied");

    // --- Tenant store ---
    let tenants = Arc::new(TenantStore::new(
        &config.tenant_data_dir,
        Duration::from_secs(config.statement_timeout_secs),
    ));

    // --- Notifier ---
    let notifier: Arc<dyn Notifier> = match &config.smtp {
        Some(smtp) => {
            let notifier = SmtpNotifier::new(smtp).expect("Failed to build SMTP notifier");
            tracing::info!(host = %smtp.host, "SMTP notifier configured");
            Arc::new(notifier)
        }
        None => {
            tracing::info!("No SMTP configuration; activation codes are logged only");
            Arc::new(LogNotifier)
        }
    };

    // --- Application ---
    let state = AppState {
        pool,
        tenants,
        config: Arc::new(config.clone()),
        notifier,
    };
    let app = routes::build_app(state);

    // --- Serve ---
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind {addr}: {e}"));
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Ensure the catalog file's parent directory exists before sqlx opens it.
fn prepare_catalog_dir(url: &str) {
    if let Some(path) = url.strip_prefix("sqlite://") {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).expect("Failed to create catalog directory");
            }
        }
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
