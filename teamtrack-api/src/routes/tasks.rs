//! Task endpoints
//!
//! # Endpoints
//!
//! - `GET /v1/tasks` - Tasks visible to the caller, newest first
//! - `POST /v1/tasks` - Create a task (Admin)
//! - `GET /v1/tasks/:id` - Single task, if visible
//! - `PUT /v1/tasks/:id` - Edit or reassign a task (Admin)
//! - `DELETE /v1/tasks/:id` - Delete a task (Admin)
//! - `PUT /v1/tasks/:id/status` - Move an assigned task along the workflow (Staff)
//!
//! # Example
//!
//! ```text
//! POST /v1/tasks
//! {
//!   "title": "Write release notes",
//!   "type": "individual",
//!   "due_date": "2026-11-01",
//!   "assigned_to": [7]
//! }
//! ```

use crate::{
    app::AppState,
    error::{validate_request, ApiError, ApiResult},
    routes::auth::MessageResponse,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use teamtrack_shared::{
    auth::{
        authorization::{authorize, Operation},
        identity::Identity,
    },
    models::task::{Task, TaskStatus, TaskType},
    service::tasks::{self, TaskDraft, TaskEdit},
};
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    pub description: Option<String>,

    #[serde(rename = "type")]
    pub task_type: TaskType,

    pub due_date: Option<NaiveDate>,

    /// Staff user ids; accepts `staff_ids` as well
    #[serde(default, alias = "staff_ids")]
    pub assigned_to: Vec<i64>,
}

/// Edit task request; omitted fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate)]
pub struct EditTaskRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    pub description: Option<String>,

    #[serde(rename = "type")]
    pub task_type: Option<TaskType>,

    pub status: Option<String>,

    pub due_date: Option<NaiveDate>,

    #[serde(alias = "staff_ids")]
    pub assigned_to: Option<Vec<i64>>,
}

impl EditTaskRequest {
    fn into_edit(self) -> Result<TaskEdit, ApiError> {
        let status = self
            .status
            .as_deref()
            .map(str::parse::<TaskStatus>)
            .transpose()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        Ok(TaskEdit {
            title: self.title,
            description: self.description,
            task_type: self.task_type,
            status,
            due_date: self.due_date,
            assigned_to: self.assigned_to,
        })
    }
}

/// Status update request
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(tasks::list_tasks(&state.db, &identity).await?))
}

/// Get a task
///
/// # Errors
///
/// - `404 Not Found`: no such task, or the caller may not see it
pub async fn get_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(task_id): Path<i64>,
) -> ApiResult<Json<Task>> {
    Ok(Json(tasks::get_task(&state.db, &identity, task_id).await?))
}

/// Create a task
///
/// # Errors
///
/// - `400 Bad Request`: assignee is not Staff, or too many for an individual task
/// - `403 Forbidden`: caller is not an Admin
/// - `422 Unprocessable Entity`: invalid title
pub async fn create_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    authorize(&identity, Operation::ManageTasks)?;
    validate_request(&req)?;

    let draft = TaskDraft {
        title: req.title,
        description: req.description,
        task_type: req.task_type,
        due_date: req.due_date,
        assigned_to: req.assigned_to,
    };

    let task = tasks::create_task(&state.db, &identity, draft).await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// Edit a task
///
/// Admins may set any status here.
///
/// # Errors
///
/// - `400 Bad Request`: unknown status, invalid assignees
/// - `403 Forbidden`: caller is not an Admin
/// - `404 Not Found`: no such task
pub async fn edit_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(task_id): Path<i64>,
    Json(req): Json<EditTaskRequest>,
) -> ApiResult<Json<Task>> {
    authorize(&identity, Operation::ManageTasks)?;
    validate_request(&req)?;

    let task = tasks::edit_task(&state.db, &identity, task_id, req.into_edit()?).await?;

    Ok(Json(task))
}

/// Update task status
///
/// # Errors
///
/// - `400 Bad Request`: unknown status
/// - `403 Forbidden`: caller is not Staff assigned to the task
/// - `404 Not Found`: no such task
/// - `409 Conflict`: transition not allowed from the current status
pub async fn update_status(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(task_id): Path<i64>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<Json<Task>> {
    Ok(Json(
        tasks::update_task_status(&state.db, &identity, task_id, &req.status).await?,
    ))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(task_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    tasks::delete_task(&state.db, &identity, task_id).await?;

    Ok(MessageResponse::new("Task deleted successfully"))
}
