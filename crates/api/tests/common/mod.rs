//! Shared helpers for HTTP-level integration tests.
//!
//! Builds the full application router with all middleware layers, backed by
//! a migrated test catalog pool and a throwaway tenant data directory, so
//! tests exercise the same stack production uses.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tower::ServiceExt;

use lattice_api::auth::credential::SigningConfig;
use lattice_api::config::ServerConfig;
use lattice_api::notify::LogNotifier;
use lattice_api::routes;
use lattice_api::state::AppState;
use lattice_tenant::TenantStore;

/// Signing secret used by every test app.
pub const TEST_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(tenant_data_dir: &str) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        statement_timeout_secs: 5,
        catalog_url: "sqlite::memory:".to_string(),
        tenant_data_dir: tenant_data_dir.to_string(),
        signing: SigningConfig {
            secret: TEST_SECRET.to_string(),
        },
        smtp: None,
    }
}

/// Build the full application router over the given catalog pool and
/// tenant data directory.
pub fn build_test_app(pool: SqlitePool, tenant_dir: &std::path::Path) -> Router {
    let config = test_config(&tenant_dir.display().to_string());
    let tenants = Arc::new(TenantStore::new(
        tenant_dir,
        Duration::from_secs(config.statement_timeout_secs),
    ));

    let state = AppState {
        pool,
        tenants,
        config: Arc::new(config),
        notifier: Arc::new(LogNotifier),
    };

    routes::build_app(state)
}

/// Issue a GET request against the app.
pub async fn get(app: Router, path: &str) -> Response {
    app.oneshot(
        Request::builder()
            .uri(path)
            .body(Body::empty())
            .expect("request must build"),
    )
    .await
    .expect("request must not fail at the transport level")
}

/// Issue a POST request with a JSON body against the app.
pub async fn post_json(app: Router, path: &str, body: serde_json::Value) -> Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request must build"),
    )
    .await
    .expect("request must not fail at the transport level")
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body must collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body must be valid JSON")
}

/// Percent-encode a query-string value.
pub fn urlencode(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{b:02X}"),
        })
        .collect()
}
