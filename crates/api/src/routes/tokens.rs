//! Route definitions for the `/tokens` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::tokens;
use crate::state::AppState;

/// Routes mounted at `/tokens`.
///
/// ```text
/// POST /                 -> create_token (pending)
/// GET  /?user_id=        -> list_tokens
/// POST /{id}/activate    -> activate_token
/// GET  /{id}/uses        -> list_uses
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(tokens::create_token).get(tokens::list_tokens))
        .route("/{id}/activate", post(tokens::activate_token))
        .route("/{id}/uses", get(tokens::list_uses))
}
