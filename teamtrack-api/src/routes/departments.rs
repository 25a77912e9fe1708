//! Department management endpoints (Admin only)

use crate::{app::AppState, error::ApiResult, routes::auth::MessageResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use teamtrack_shared::{
    auth::identity::Identity, models::department::DepartmentRecord, service::directory,
};

/// Body of both create and rename
#[derive(Debug, Deserialize)]
pub struct DepartmentRequest {
    pub department_name: String,
}

pub async fn list_departments(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Vec<DepartmentRecord>>> {
    Ok(Json(directory::list_departments(&state.db, &identity).await?))
}

pub async fn create_department(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<DepartmentRequest>,
) -> ApiResult<(StatusCode, Json<DepartmentRecord>)> {
    let department =
        directory::create_department(&state.db, &identity, &req.department_name).await?;

    Ok((StatusCode::CREATED, Json(department)))
}

/// Rename a department
///
/// # Errors
///
/// - `400 Bad Request`: blank name, or the QA department
/// - `404 Not Found`: no such department
/// - `409 Conflict`: name already taken
pub async fn update_department(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(department_id): Path<i64>,
    Json(req): Json<DepartmentRequest>,
) -> ApiResult<Json<DepartmentRecord>> {
    Ok(Json(
        directory::rename_department(&state.db, &identity, department_id, &req.department_name)
            .await?,
    ))
}

/// Delete a department
///
/// # Errors
///
/// - `400 Bad Request`: the QA department
/// - `404 Not Found`: no such department
/// - `409 Conflict`: users still belong to it
pub async fn delete_department(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(department_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    directory::delete_department(&state.db, &identity, department_id).await?;

    Ok(MessageResponse::new("Department deleted successfully"))
}
