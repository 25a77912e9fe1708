//! QA review endpoints
//!
//! # Endpoints
//!
//! - `GET /v1/qa/review` - Tasks in `Ready for QA`
//! - `POST /v1/qa/review/:task_id` - Approve or reject a task
//! - `GET /v1/qa/reviews/:task_id` - Review history of a task
//!
//! ```text
//! POST /v1/qa/review/12
//! { "status": "Rejected", "comments": "Missing screenshots" }
//! ```

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use teamtrack_shared::{
    auth::identity::Identity,
    models::{review::QaReview, task::Task},
    service::reviews::{self, ReviewOutcome},
};

/// Review submission
#[derive(Debug, Deserialize)]
pub struct SubmitReviewRequest {
    /// `Approved` or `Rejected`
    #[serde(alias = "decision")]
    pub status: String,

    pub comments: Option<String>,
}

pub async fn review_queue(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(reviews::review_queue(&state.db, &identity).await?))
}

/// Submit a review
///
/// Approval completes the task, rejection sends it back to the assignees.
///
/// # Errors
///
/// - `400 Bad Request`: decision other than `Approved` or `Rejected`
/// - `403 Forbidden`: caller is not in the QA department
/// - `404 Not Found`: no such task
/// - `409 Conflict`: task is not `Ready for QA`
pub async fn submit_review(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(task_id): Path<i64>,
    Json(req): Json<SubmitReviewRequest>,
) -> ApiResult<Json<ReviewOutcome>> {
    let outcome =
        reviews::submit_review(&state.db, &identity, task_id, &req.status, req.comments).await?;

    Ok(Json(outcome))
}

pub async fn review_history(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(task_id): Path<i64>,
) -> ApiResult<Json<Vec<QaReview>>> {
    Ok(Json(
        reviews::review_history(&state.db, &identity, task_id).await?,
    ))
}
