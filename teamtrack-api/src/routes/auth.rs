//! Authentication endpoints
//!
//! # Endpoints
//!
//! - `POST /v1/auth/login` - Exchange username and password for a session token
//! - `GET /v1/auth/me` - Profile of the caller
//! - `POST /v1/auth/change-password` - Change the caller's password

use crate::{
    app::AppState,
    error::{validate_request, ApiResult},
};
use axum::{extract::State, Extension, Json};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use teamtrack_shared::{
    auth::{
        identity::Identity,
        jwt::{self, Claims},
    },
    models::user::UserProfile,
    service::account,
};
use validator::Validate;

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Session token (HS256 JWT)
    pub token: String,

    /// Logged in user
    pub user: UserProfile,
}

/// Change password request
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[serde(alias = "currentPassword")]
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[serde(alias = "newPassword")]
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// Log in
///
/// ```text
/// POST /v1/auth/login
/// { "username": "jdoe", "password": "..." }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: unknown username or wrong password (same message for both)
/// - `422 Unprocessable Entity`: empty username or password
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    validate_request(&req)?;

    let user = account::login(&state.db, &req.username, &req.password).await?;

    let claims = Claims::new(
        user.user_id,
        user.role.clone(),
        user.department.clone(),
        Duration::hours(state.config.jwt.expiry_hours),
    );
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    Ok(Json(LoginResponse { token, user }))
}

/// Profile of the caller
///
/// # Errors
///
/// - `404 Not Found`: the account was deleted after the token was issued
pub async fn me(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<UserProfile>> {
    Ok(Json(account::current_profile(&state.db, &identity).await?))
}

/// Change the caller's password
///
/// # Errors
///
/// - `400 Bad Request`: current password is wrong
/// - `422 Unprocessable Entity`: new password shorter than 8 characters
pub async fn change_password(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    validate_request(&req)?;

    account::change_password(&state.db, &identity, &req.current_password, &req.new_password)
        .await?;

    Ok(MessageResponse::new("Password updated successfully"))
}
