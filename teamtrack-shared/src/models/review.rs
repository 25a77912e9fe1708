//! QA review model
//!
//! A review row is appended for every decision, so a task that goes through
//! several reject/resubmit cycles keeps its full history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use std::fmt;
use std::str::FromStr;

use super::task::TaskStatus;

/// Outcome of a QA review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "review_decision")]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

/// Error returned for any decision other than `Approved` or `Rejected`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Status must be Approved or Rejected")]
pub struct InvalidDecision;

impl ReviewDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewDecision::Approved => "Approved",
            ReviewDecision::Rejected => "Rejected",
        }
    }

    /// Status the reviewed task moves to
    pub fn resulting_status(&self) -> TaskStatus {
        match self {
            ReviewDecision::Approved => TaskStatus::Completed,
            ReviewDecision::Rejected => TaskStatus::Rejected,
        }
    }
}

impl FromStr for ReviewDecision {
    type Err = InvalidDecision;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Approved" => Ok(ReviewDecision::Approved),
            "Rejected" => Ok(ReviewDecision::Rejected),
            _ => Err(InvalidDecision),
        }
    }
}

impl fmt::Display for ReviewDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct QaReview {
    pub review_id: i64,
    pub task_id: i64,

    /// Reviewer (null once that user is deleted)
    pub qa_id: Option<i64>,

    pub decision: ReviewDecision,
    pub comments: Option<String>,

    /// Assigned by the database at insert time
    pub reviewed_at: DateTime<Utc>,
}

impl QaReview {
    pub async fn insert<'e, E: PgExecutor<'e>>(
        executor: E,
        task_id: i64,
        qa_id: i64,
        decision: ReviewDecision,
        comments: Option<&str>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, QaReview>(
            r#"
            INSERT INTO qa_reviews (task_id, qa_id, decision, comments)
            VALUES ($1, $2, $3, $4)
            RETURNING review_id, task_id, qa_id, decision, comments, reviewed_at
            "#,
        )
        .bind(task_id)
        .bind(qa_id)
        .bind(decision)
        .bind(comments)
        .fetch_one(executor)
        .await
    }

    /// Review history of a task, newest first
    pub async fn list_for_task(pool: &PgPool, task_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, QaReview>(
            r#"
            SELECT review_id, task_id, qa_id, decision, comments, reviewed_at
            FROM qa_reviews
            WHERE task_id = $1
            ORDER BY reviewed_at DESC, review_id DESC
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await
    }
}
