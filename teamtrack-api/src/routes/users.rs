//! User management endpoints (Admin only)
//!
//! # Endpoints
//!
//! - `GET /v1/users` - List users with role and department names
//! - `POST /v1/users` - Create a user with the default initial password
//! - `PUT /v1/users/:id` - Update name, email, role or department
//! - `DELETE /v1/users/:id` - Delete a user other than the caller

use crate::{
    app::AppState,
    error::{validate_request, ApiResult},
    routes::auth::MessageResponse,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use teamtrack_shared::{
    auth::{
        authorization::{authorize, Operation},
        identity::Identity,
    },
    models::user::{UpdateUser, UserProfile},
    service::directory::{self, NewUser},
};
use validator::Validate;

/// Create user request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100, message = "Username must be 1-100 characters"))]
    pub username: String,

    #[validate(length(min = 1, max = 255, message = "Full name must be 1-255 characters"))]
    pub full_name: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    pub role_id: i64,

    pub department_id: Option<i64>,
}

/// List users
///
/// # Errors
///
/// - `403 Forbidden`: caller is not an Admin
pub async fn list_users(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Vec<UserProfile>>> {
    Ok(Json(directory::list_users(&state.db, &identity).await?))
}

/// Create a user
///
/// The new account starts with the configured default password.
///
/// # Errors
///
/// - `400 Bad Request`: unknown role or department
/// - `403 Forbidden`: caller is not an Admin
/// - `409 Conflict`: username already taken
/// - `422 Unprocessable Entity`: invalid fields
pub async fn create_user(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    authorize(&identity, Operation::ManageDirectory)?;
    validate_request(&req)?;

    let new_user = NewUser {
        username: req.username,
        full_name: req.full_name,
        email: req.email,
        role_id: req.role_id,
        department_id: req.department_id,
    };

    let profile = directory::create_user(
        &state.db,
        &identity,
        new_user,
        &state.config.users.default_password,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(profile)))
}

/// Update a user
///
/// # Errors
///
/// - `400 Bad Request`: blank name or email, unknown role or department
/// - `403 Forbidden`: caller is not an Admin
/// - `404 Not Found`: no such user
pub async fn update_user(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(user_id): Path<i64>,
    Json(req): Json<UpdateUser>,
) -> ApiResult<Json<UserProfile>> {
    Ok(Json(
        directory::update_user(&state.db, &identity, user_id, req).await?,
    ))
}

/// Delete a user
///
/// # Errors
///
/// - `400 Bad Request`: caller tried to delete their own account
/// - `403 Forbidden`: caller is not an Admin
/// - `404 Not Found`: no such user
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    directory::delete_user(&state.db, &identity, user_id).await?;

    Ok(MessageResponse::new("User deleted successfully"))
}
