//! The query gateway: the single authenticated data-plane entry point.
//!
//! Every branch of the protocol produces a response envelope; there is no
//! silent drop and no bare protocol-level failure for application-level
//! errors. The HTTP status mirrors the envelope status (200 or 400) -- the
//! error taxonomy is flattened at the wire level and `error_message`
//! carries the distinction.

use axum::extract::{RawQuery, State};
use axum::http::{StatusCode, Uri};
use axum::Json;
use serde::Deserialize;

use lattice_core::envelope::QueryEnvelope;
use lattice_core::error::CoreError;
use lattice_db::repositories::{TokenRepo, UseRepo};

use crate::auth::credential;
use crate::state::AppState;

/// Query parameters for `GET /query/`. Both are optional so their absence
/// can be answered with an envelope instead of an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct GatewayParams {
    pub token: Option<String>,
    pub q: Option<String>,
}

/// GET /api/v1/query/?token=<credential>&q=<urlencoded SQL>
///
/// The query string is parsed by hand so that even an undeserializable
/// request ends in the terminal catch-all envelope rather than an
/// extractor rejection.
pub async fn run_query(
    State(state): State<AppState>,
    uri: Uri,
    RawQuery(raw): RawQuery,
) -> (StatusCode, Json<QueryEnvelope>) {
    let params = match raw.as_deref() {
        Some(raw) => serde_urlencoded::from_str::<GatewayParams>(raw).ok(),
        None => Some(GatewayParams::default()),
    };

    let envelope = match params {
        Some(params) => handle(&state, &uri, params).await,
        // Terminal catch-all: no request goes unanswered.
        None => QueryEnvelope::bad(uri.to_string(), "Unknown error"),
    };

    let status = StatusCode::from_u16(envelope.status).unwrap_or(StatusCode::BAD_REQUEST);
    (status, Json(envelope))
}

async fn handle(state: &AppState, uri: &Uri, params: GatewayParams) -> QueryEnvelope {
    // The envelope echoes the statement text; before one is known, the
    // request line stands in.
    let echo = params.q.clone().unwrap_or_else(|| uri.to_string());

    // 1. Extract the credential.
    let Some(token_string) = params.token else {
        return QueryEnvelope::bad(echo, CoreError::MissingToken.to_string());
    };

    // 2. Validate the signature, then resolve the catalog row by the exact
    //    credential string. The row is the source of truth; the claims only
    //    prove the string was issued here.
    if credential::verify(&token_string, &state.config.signing).is_err() {
        return QueryEnvelope::bad(echo, CoreError::InvalidToken.to_string());
    }
    let token = match TokenRepo::find_by_token(&state.pool, &token_string).await {
        Ok(Some(token)) => token,
        Ok(None) => return QueryEnvelope::bad(echo, CoreError::InvalidToken.to_string()),
        Err(err) => {
            tracing::error!(error = %err, "Catalog lookup failed during gateway call");
            return QueryEnvelope::bad(echo, "Unknown error");
        }
    };

    // 3. A pending token is well-formed but not yet usable.
    if !token.is_active {
        return QueryEnvelope::bad(echo, CoreError::TokenNotActive.to_string());
    }

    // 4. Extract the statement.
    let Some(sql) = params.q else {
        return QueryEnvelope::bad(echo, CoreError::MissingQuery.to_string());
    };

    // 5. Execute against the token's tenant database. Storage failures come
    //    back inside the envelope.
    let envelope = state
        .tenants
        .execute(token.user_id, &token.database_name, &sql)
        .await;

    // 6. Append the audit record, failures included. Auditing is a side
    //    effect of the request, never part of its contract.
    audit(state, &token_string, &envelope).await;

    // 7. The envelope is the response.
    envelope
}

/// Append a Use record for a completed call. Failures are logged and never
/// surface to the client.
async fn audit(state: &AppState, token_string: &str, envelope: &QueryEnvelope) {
    let data = match serde_json::to_string(envelope) {
        Ok(data) => data,
        Err(err) => {
            tracing::warn!(error = %err, "Could not serialize envelope for audit");
            return;
        }
    };

    match UseRepo::insert(&state.pool, token_string, &data).await {
        Ok(true) => {}
        Ok(false) => {
            tracing::warn!("Audit record not attached: credential matches no token row");
        }
        Err(err) => {
            tracing::warn!(error = %err, "Audit record insert failed");
        }
    }
}
