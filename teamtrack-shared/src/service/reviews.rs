//! QA review operations
//!
//! Submitting a review writes the review row, the task's new status and one
//! metrics row per assignee in a single transaction, with the task row locked
//! so two reviewers cannot both decide on the same submission.

use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;

use super::{ServiceError, ServiceResult};
use crate::auth::authorization::{authorize, Operation};
use crate::auth::identity::Identity;
use crate::models::metrics::{is_on_time, record_review_outcome};
use crate::models::review::{QaReview, ReviewDecision};
use crate::models::task::{Task, TaskStatus};

/// Result of a review submission
#[derive(Debug, Clone, Serialize)]
pub struct ReviewOutcome {
    pub task: Task,
    pub review: QaReview,
}

/// Tasks waiting for a QA decision
pub async fn review_queue(pool: &PgPool, identity: &Identity) -> ServiceResult<Vec<Task>> {
    authorize(identity, Operation::ReviewTasks)?;

    Ok(Task::list_by_status(pool, TaskStatus::ReadyForQa).await?)
}

/// Records a QA decision on a task in `Ready for QA`
///
/// `decision` must be exactly `Approved` or `Rejected`; anything else is
/// refused before the database is touched.
pub async fn submit_review(
    pool: &PgPool,
    identity: &Identity,
    task_id: i64,
    decision: &str,
    comments: Option<String>,
) -> ServiceResult<ReviewOutcome> {
    authorize(identity, Operation::ReviewTasks)?;

    let decision = decision
        .parse::<ReviewDecision>()
        .map_err(|e| ServiceError::InvalidInput(e.to_string()))?;

    let comments = comments
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    let mut tx = pool.begin().await?;

    let current = Task::lock_status(&mut tx, task_id)
        .await?
        .ok_or(ServiceError::NotFound("Task"))?;

    let target = decision.resulting_status();
    if !current.accepts_review() {
        return Err(ServiceError::InvalidTransition {
            from: current,
            to: target,
        });
    }

    let review = QaReview::insert(
        &mut *tx,
        task_id,
        identity.user_id,
        decision,
        comments.as_deref(),
    )
    .await?;

    Task::transition(&mut *tx, task_id, current, target).await?;

    let task = Task::find_by_id(&mut *tx, task_id)
        .await?
        .ok_or(ServiceError::NotFound("Task"))?;

    let on_time = is_on_time(task.due_date, Utc::now().date_naive());
    let logged = record_review_outcome(&mut *tx, task_id, decision, on_time).await?;

    tx.commit().await?;

    tracing::info!(
        task_id,
        review_id = review.review_id,
        qa_id = identity.user_id,
        decision = %decision,
        on_time,
        metrics_rows = logged,
        "Review submitted"
    );

    Ok(ReviewOutcome { task, review })
}

/// Review history of a task, newest first
pub async fn review_history(
    pool: &PgPool,
    identity: &Identity,
    task_id: i64,
) -> ServiceResult<Vec<QaReview>> {
    authorize(identity, Operation::ViewReviewHistory)?;

    if Task::status_of(pool, task_id).await?.is_none() {
        return Err(ServiceError::NotFound("Task"));
    }

    Ok(QaReview::list_for_task(pool, task_id).await?)
}
