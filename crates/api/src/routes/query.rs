//! Route definition for the query gateway.

use axum::routing::get;
use axum::Router;

use crate::handlers::query;
use crate::state::AppState;

/// The data-plane surface: `GET /query/?token=&q=`.
pub fn router() -> Router<AppState> {
    Router::new().route("/query/", get(query::run_query))
}
