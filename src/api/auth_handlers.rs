//! Authentication route handlers: account creation, token login and user info.
//!
//! Endpoints:
//! - `POST /auth`        Create an account (JSON username + password)
//! - `POST /auth/token`  Exchange form credentials for a bearer token
//! - `GET  /auth/me`     Returns the authenticated user (protected)

use crate::api::handlers::{ApiState, AppError};
use crate::auth::extractor::AuthUser;
use crate::auth::jwt::encode_jwt;
use crate::users::{hash_password, User};
use axum::{extract::State, http::StatusCode, Form, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

// ============================================================================
// Request / Response types
// ============================================================================

/// Request body for POST /auth
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
}

/// Form body for POST /auth/token (OAuth2 password grant fields)
#[derive(Debug, Deserialize)]
pub struct TokenForm {
    pub username: String,
    pub password: String,
}

/// Response for POST /auth/token
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Public user info
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub username: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth: Create a password account.
pub async fn create_user(
    State(state): State<ApiState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let username = req.username.trim();
    if username.is_empty() {
        return Err(AppError::BadRequest("Username is required".to_string()));
    }
    if req.password.is_empty() {
        return Err(AppError::BadRequest("Password is required".to_string()));
    }

    let password_hash = hash_password(&req.password, state.password_hash_cost)?;
    let created = state
        .users
        .create_user(User {
            username: username.to_string(),
            password_hash,
        })
        .await?;
    if !created {
        return Err(AppError::Conflict(
            "An account with this username already exists".to_string(),
        ));
    }

    info!(username = %username, "User created");
    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            username: username.to_string(),
        }),
    ))
}

/// POST /auth/token: Username/password login.
///
/// Error messages never reveal whether the username exists.
pub async fn login_for_access_token(
    State(state): State<ApiState>,
    Form(form): Form<TokenForm>,
) -> Result<Json<TokenResponse>, AppError> {
    let auth_config = state
        .auth_config
        .as_ref()
        .ok_or_else(|| AppError::Forbidden("Authentication not configured".to_string()))?;

    let invalid_credentials =
        || AppError::Unauthorized("Invalid credentials were given".to_string());

    let user = state
        .users
        .get_user(&form.username)
        .await?
        .ok_or_else(invalid_credentials)?;
    if !user.verify_password(&form.password) {
        return Err(invalid_credentials());
    }

    let access_token = encode_jwt(
        &user.username,
        &auth_config.jwt_secret,
        auth_config.jwt_expiry_secs,
    )
    .map_err(AppError::Internal)?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// GET /auth/me: The user the bearer token was issued to.
pub async fn get_me(user: AuthUser) -> Json<UserResponse> {
    Json(UserResponse {
        username: user.username,
    })
}

// ============================================================================
// Tests
// ============================================================================
