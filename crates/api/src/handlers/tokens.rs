//! Handlers for the `/tokens` resource (creation, activation, listing).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use lattice_core::error::CoreError;
use lattice_core::naming::validate_database_name;
use lattice_core::types::DbId;
use lattice_db::models::token::TokenResponse;
use lattice_db::models::use_record::UseRecord;
use lattice_db::repositories::{TokenRepo, UseRepo, UserRepo};

use crate::auth::{activation, credential};
use crate::error::{is_unique_violation, ApiError, ApiResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / query types
// ---------------------------------------------------------------------------

/// Request body for `POST /tokens`.
#[derive(Debug, Deserialize)]
pub struct CreateTokenRequest {
    pub user_id: DbId,
    pub database_name: String,
}

/// Request body for `POST /tokens/{id}/activate`.
#[derive(Debug, Deserialize)]
pub struct ActivateTokenRequest {
    pub code: String,
}

/// Query parameters for `GET /tokens`.
#[derive(Debug, Deserialize)]
pub struct ListTokensParams {
    pub user_id: DbId,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/tokens
///
/// Create a pending token for `(owner, database_name)`. The activation code
/// is delivered out-of-band through the notifier and is absent from the
/// response.
pub async fn create_token(
    State(state): State<AppState>,
    Json(input): Json<CreateTokenRequest>,
) -> ApiResult<(StatusCode, Json<TokenResponse>)> {
    // 1. The name becomes a filesystem path component later; reject bad
    //    input before any row exists.
    validate_database_name(&input.database_name)?;

    // 2. Resolve the owner.
    let user = UserRepo::find_by_id(&state.pool, input.user_id)
        .await?
        .ok_or(CoreError::NotFound { entity: "User" })?;

    // 3. Insert the pending row. One token per (owner, database name).
    let token = TokenRepo::create(&state.pool, user.id, &input.database_name)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                ApiError::Core(CoreError::Conflict(format!(
                    "A token for database '{}' already exists",
                    input.database_name
                )))
            } else {
                ApiError::Database(err)
            }
        })?;

    // 4. Sign the credential against the now-existing row and generate the
    //    activation code.
    let claims = credential::TokenClaims {
        token_id: token.id,
        user_id: user.id,
        email: user.email.clone(),
        database_name: token.database_name.clone(),
        created_at: token.created_at.timestamp(),
    };
    let signed = credential::sign(&claims, &state.config.signing)
        .map_err(|e| ApiError::Internal(format!("Credential signing error: {e}")))?;

    let code = activation::generate_code();
    let expires_at = activation::expiry_after(Utc::now());

    // 5. Second creation write. If it fails the row exists but is unusable;
    //    that is a defined failure mode, not something to retry silently.
    let updated =
        TokenRepo::update_credentials(&state.pool, token.id, &signed, &code, expires_at).await;
    match updated {
        Ok(true) => {}
        Ok(false) => return Err(ApiError::Core(CoreError::TokenCreationFailed)),
        Err(err) => {
            tracing::error!(token_id = token.id, error = %err, "Token credential write failed");
            return Err(ApiError::Core(CoreError::TokenCreationFailed));
        }
    }

    // 6. Deliver the code. Best-effort: the notifier logs its own failures.
    state.notifier.send(&user.email, &code).await;

    let token = TokenRepo::find_by_id(&state.pool, token.id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Token" })?;

    tracing::info!(token_id = token.id, user_id = user.id, database = %token.database_name, "Token created (pending)");
    Ok((StatusCode::CREATED, Json(token.into())))
}

/// POST /api/v1/tokens/{id}/activate
///
/// Verify an activation code. Activating an already-active token is a
/// no-op success, so the activation page can be retried safely. A wrong or
/// expired code leaves the token pending.
pub async fn activate_token(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ActivateTokenRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let token = TokenRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Token" })?;

    // 1. Idempotent on repeat calls.
    if token.is_active {
        return Ok(Json(token.into()));
    }

    // 2. Match the code, case-insensitively. A token without a stored code
    //    cannot be activated.
    let stored = token.activation_code.as_deref().unwrap_or("");
    if !activation::code_matches(stored, &input.code) {
        return Err(ApiError::Core(CoreError::InvalidActivationCode));
    }

    // 3. Enforce the stored expiry.
    let expired = match token.activation_code_expires_at {
        Some(expires_at) => activation::is_expired(expires_at, Utc::now()),
        None => true,
    };
    if expired {
        return Err(ApiError::Core(CoreError::InvalidActivationCode));
    }

    // 4. Flip to active and clear the code.
    if !TokenRepo::activate(&state.pool, token.id).await? {
        return Err(ApiError::Core(CoreError::UpdateFailed(
            "activation did not persist".into(),
        )));
    }

    let token = TokenRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Token" })?;

    tracing::info!(token_id = token.id, "Token activated");
    Ok(Json(token.into()))
}

/// GET /api/v1/tokens?user_id=
///
/// List a user's tokens in insertion order.
pub async fn list_tokens(
    State(state): State<AppState>,
    Query(params): Query<ListTokensParams>,
) -> ApiResult<Json<Vec<TokenResponse>>> {
    let tokens = TokenRepo::list_by_user(&state.pool, params.user_id).await?;
    Ok(Json(tokens.into_iter().map(Into::into).collect()))
}

/// GET /api/v1/tokens/{id}/uses
///
/// The append-only audit trail for one token, in insertion order.
pub async fn list_uses(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> ApiResult<Json<Vec<UseRecord>>> {
    // 404 for a token that never existed, empty list for one never used.
    TokenRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Token" })?;

    let uses = UseRepo::list_by_token(&state.pool, id).await?;
    Ok(Json(uses))
}
