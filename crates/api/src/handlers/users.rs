//! Handlers for the `/users` resource (signup, fetch, credential check).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use subtle::ConstantTimeEq;

use lattice_core::error::CoreError;
use lattice_core::types::DbId;
use lattice_db::models::user::{CreateUser, UserResponse};
use lattice_db::repositories::UserRepo;

use crate::error::{is_unique_violation, ApiError, ApiResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /users/verify`.
///
/// The hash arrives pre-computed: plaintext passwords never cross this
/// boundary.
#[derive(Debug, Deserialize)]
pub struct VerifyCredentialsRequest {
    pub email: String,
    pub password_hash: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/users
///
/// Register a user. The email must be unique; on violation the response is
/// a generic conflict that does not name the failed constraint.
pub async fn create_user(
    State(state): State<AppState>,
    Json(input): Json<CreateUser>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    if input.full_name.trim().is_empty() {
        return Err(ApiError::BadRequest("full_name must not be empty".into()));
    }
    if input.email.trim().is_empty() || !input.email.contains('@') {
        return Err(ApiError::BadRequest("email must be a valid address".into()));
    }
    if input.password_hash.trim().is_empty() {
        return Err(ApiError::BadRequest("password_hash must not be empty".into()));
    }

    let user = UserRepo::create(&state.pool, &input).await.map_err(|err| {
        if is_unique_violation(&err) {
            ApiError::Core(CoreError::Conflict("Could not create the account".into()))
        } else {
            ApiError::Database(err)
        }
    })?;

    tracing::info!(user_id = user.id, "User registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /api/v1/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> ApiResult<Json<UserResponse>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "User" })?;
    Ok(Json(user.into()))
}

/// POST /api/v1/users/verify
///
/// Check a stored credential: compares the presented hash against the
/// stored one in constant time. Wrong email and wrong hash are
/// indistinguishable in the response.
pub async fn verify_credentials(
    State(state): State<AppState>,
    Json(input): Json<VerifyCredentialsRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Incorrect email or password".into()))?;

    let matches: bool = user
        .password_hash
        .as_bytes()
        .ct_eq(input.password_hash.as_bytes())
        .into();
    if !matches {
        return Err(ApiError::Unauthorized("Incorrect email or password".into()));
    }

    Ok(Json(user.into()))
}
