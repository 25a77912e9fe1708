//! Task metrics
//!
//! Per-user counts are derived from task assignments. Efficiency and on-time
//! figures come from `metrics_log`, which receives one row per assignee each
//! time QA decides on a task.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};

use super::review::ReviewDecision;
use super::task::TaskStatus;

/// Efficiency recorded for an approved task
pub const APPROVED_SCORE: f64 = 100.0;

/// Efficiency recorded for a rejected task
pub const REJECTED_SCORE: f64 = 0.0;

/// Task counts for one user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetrics {
    pub total: i64,

    /// Pending or In Progress
    pub pending: i64,

    /// Ready for QA
    pub in_review: i64,

    /// Completed
    pub approved: i64,

    pub rejected: i64,
}

impl UserMetrics {
    pub fn from_status_counts(counts: &[(TaskStatus, i64)]) -> Self {
        counts
            .iter()
            .fold(UserMetrics::default(), |mut metrics, (status, count)| {
                metrics.total += count;
                match status {
                    TaskStatus::Pending | TaskStatus::InProgress => metrics.pending += count,
                    TaskStatus::ReadyForQa => metrics.in_review += count,
                    TaskStatus::Completed => metrics.approved += count,
                    TaskStatus::Rejected => metrics.rejected += count,
                }
                metrics
            })
    }

    pub async fn for_user(pool: &PgPool, user_id: i64) -> Result<Self, sqlx::Error> {
        let counts: Vec<(TaskStatus, i64)> = sqlx::query_as(
            r#"
            SELECT t.status, COUNT(*)
            FROM task_assignments ta
            JOIN tasks t ON t.task_id = ta.task_id
            WHERE ta.staff_id = $1
            GROUP BY t.status
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(Self::from_status_counts(&counts))
    }
}

/// Mean efficiency of one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StaffEfficiency {
    pub user_id: i64,
    pub name: String,
    pub efficiency_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalMetrics {
    pub staff: Vec<StaffEfficiency>,

    /// Percentage of logged outcomes that met their due date
    pub on_time_rate: f64,
}

impl GlobalMetrics {
    pub async fn compute(pool: &PgPool) -> Result<Self, sqlx::Error> {
        let staff = sqlx::query_as::<_, StaffEfficiency>(
            r#"
            SELECT u.user_id, u.full_name AS name,
                   ROUND(COALESCE(AVG(m.efficiency_score), 0)::NUMERIC, 2)::FLOAT8
                       AS efficiency_score
            FROM users u
            LEFT JOIN metrics_log m ON m.user_id = u.user_id
            GROUP BY u.user_id, u.full_name
            ORDER BY u.user_id ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        let on_time_rate: f64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(
                100.0 * SUM(CASE WHEN on_time THEN 1 ELSE 0 END) / NULLIF(COUNT(*), 0),
                0
            )::FLOAT8
            FROM metrics_log
            "#,
        )
        .fetch_one(pool)
        .await?;

        Ok(Self {
            staff,
            on_time_rate,
        })
    }
}

/// Whether work decided on `decided_on` met `due_date`
///
/// Tasks without a due date are always on time.
pub fn is_on_time(due_date: Option<NaiveDate>, decided_on: NaiveDate) -> bool {
    due_date.map_or(true, |due| decided_on <= due)
}

/// Efficiency recorded for a decision
pub fn score_for(decision: ReviewDecision) -> f64 {
    match decision {
        ReviewDecision::Approved => APPROVED_SCORE,
        ReviewDecision::Rejected => REJECTED_SCORE,
    }
}

/// Appends one metrics row per assignee of a reviewed task
pub async fn record_review_outcome<'e, E: PgExecutor<'e>>(
    executor: E,
    task_id: i64,
    decision: ReviewDecision,
    on_time: bool,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO metrics_log (user_id, task_id, efficiency_score, on_time)
        SELECT staff_id, task_id, $2, $3
        FROM task_assignments
        WHERE task_id = $1
        "#,
    )
    .bind(task_id)
    .bind(score_for(decision))
    .bind(on_time)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}
