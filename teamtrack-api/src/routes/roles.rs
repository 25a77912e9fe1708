//! Role management endpoints (Admin only)
//!
//! The built-in `Admin` role can be described but never renamed or deleted.

use crate::{app::AppState, error::ApiResult, routes::auth::MessageResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use teamtrack_shared::{
    auth::identity::Identity,
    models::role::{RoleRecord, UpdateRole},
    service::directory,
};

#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub role_name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role_name: Option<String>,
    pub description: Option<String>,
}

pub async fn list_roles(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Vec<RoleRecord>>> {
    Ok(Json(directory::list_roles(&state.db, &identity).await?))
}

/// Create a role
///
/// # Errors
///
/// - `400 Bad Request`: blank name
/// - `409 Conflict`: name already taken
pub async fn create_role(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<CreateRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleRecord>)> {
    let role = directory::create_role(&state.db, &identity, &req.role_name, req.description).await?;

    Ok((StatusCode::CREATED, Json(role)))
}

/// Update a role
///
/// # Errors
///
/// - `400 Bad Request`: renaming the Admin role
/// - `404 Not Found`: no such role
pub async fn update_role(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(role_id): Path<i64>,
    Json(req): Json<UpdateRoleRequest>,
) -> ApiResult<Json<RoleRecord>> {
    let update = UpdateRole {
        role_name: req.role_name,
        description: req.description,
    };

    Ok(Json(
        directory::update_role(&state.db, &identity, role_id, update).await?,
    ))
}

/// Delete a role
///
/// # Errors
///
/// - `400 Bad Request`: the Admin role
/// - `404 Not Found`: no such role
/// - `409 Conflict`: users still hold the role
pub async fn delete_role(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(role_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    directory::delete_role(&state.db, &identity, role_id).await?;

    Ok(MessageResponse::new("Role deleted successfully"))
}
