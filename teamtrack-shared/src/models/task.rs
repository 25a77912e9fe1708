//! Task model and database operations
//!
//! # State Machine
//!
//! ```text
//! Pending ──▶ In Progress ──▶ Ready for QA ──▶ Completed   (QA: Approved)
//!                  ▲                      └──▶ Rejected    (QA: Rejected)
//!                  └────────────────────────────┘          (Staff: resubmit)
//! ```
//!
//! Staff move tasks along the left half via [`TaskStatus::staff_can_transition_to`].
//! Only a QA review leaves `Ready for QA`. Admin edits may set any status.
//!
//! # Schema
//!
//! ```sql
//! CREATE TYPE task_type AS ENUM ('group', 'individual');
//! CREATE TYPE task_status AS ENUM (
//!     'Pending', 'In Progress', 'Ready for QA', 'Completed', 'Rejected'
//! );
//!
//! CREATE TABLE tasks (
//!     task_id BIGSERIAL PRIMARY KEY,
//!     title VARCHAR(255) NOT NULL,
//!     description TEXT,
//!     task_type task_type NOT NULL DEFAULT 'individual',
//!     status task_status NOT NULL DEFAULT 'Pending',
//!     assigned_by BIGINT REFERENCES users(user_id) ON DELETE SET NULL,
//!     due_date DATE,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//!
//! CREATE TABLE task_assignments (
//!     task_id BIGINT NOT NULL REFERENCES tasks(task_id) ON DELETE CASCADE,
//!     staff_id BIGINT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
//!     assigned_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     PRIMARY KEY (task_id, staff_id)
//! );
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool, Postgres, Transaction};
use std::fmt;
use std::str::FromStr;

/// Whether a task is worked on by a group or a single person
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Group,
    Individual,
}

impl TaskType {
    /// Upper bound on assignees, if any
    pub fn max_assignees(&self) -> Option<usize> {
        match self {
            TaskType::Group => None,
            TaskType::Individual => Some(1),
        }
    }
}

/// Lifecycle status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status")]
pub enum TaskStatus {
    Pending,

    #[sqlx(rename = "In Progress")]
    #[serde(rename = "In Progress")]
    InProgress,

    #[sqlx(rename = "Ready for QA")]
    #[serde(rename = "Ready for QA")]
    ReadyForQa,

    Completed,

    Rejected,
}

/// Error returned when a status string names no known status
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown task status: {0}")]
pub struct UnknownStatus(pub String);

impl TaskStatus {
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::ReadyForQa,
        TaskStatus::Completed,
        TaskStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::ReadyForQa => "Ready for QA",
            TaskStatus::Completed => "Completed",
            TaskStatus::Rejected => "Rejected",
        }
    }

    /// Transition table for assignees
    ///
    /// Completed is reachable only through an approving review, and a task in
    /// review cannot be pulled back by its assignee.
    pub fn staff_can_transition_to(&self, target: TaskStatus) -> bool {
        matches!(
            (self, target),
            (TaskStatus::Pending, TaskStatus::InProgress)
                | (TaskStatus::InProgress, TaskStatus::ReadyForQa)
                | (TaskStatus::Rejected, TaskStatus::InProgress)
        )
    }

    /// Whether a QA review may be submitted in this status
    pub fn accepts_review(&self) -> bool {
        *self == TaskStatus::ReadyForQa
    }
}

impl FromStr for TaskStatus {
    type Err = UnknownStatus;

    /// Exact, case-sensitive match on the display name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task with its assignees
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub task_id: i64,

    pub title: String,

    pub description: Option<String>,

    #[serde(rename = "type")]
    pub task_type: TaskType,

    pub status: TaskStatus,

    /// Admin who created the task (null once that user is deleted)
    pub assigned_by: Option<i64>,

    pub due_date: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,

    /// Assigned staff user ids, ascending
    pub assignee_ids: Vec<i64>,

    /// Assigned staff full names, in the same order as `assignee_ids`
    pub assigned_staff: Vec<String>,
}

/// Input for creating a task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub task_type: TaskType,
    pub due_date: Option<NaiveDate>,
    pub assigned_by: i64,
}

/// Partial task update; `None` leaves a column unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub task_type: Option<TaskType>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<NaiveDate>,
}

/// Task columns plus aggregated assignees; callers append WHERE before the tail
const TASK_SELECT: &str = r#"
    SELECT t.task_id, t.title, t.description, t.task_type, t.status,
           t.assigned_by, t.due_date, t.created_at,
           COALESCE(
               array_agg(ta.staff_id ORDER BY ta.staff_id)
                   FILTER (WHERE ta.staff_id IS NOT NULL),
               '{}'::BIGINT[]
           ) AS assignee_ids,
           COALESCE(
               array_agg(u.full_name::TEXT ORDER BY ta.staff_id)
                   FILTER (WHERE ta.staff_id IS NOT NULL),
               '{}'::TEXT[]
           ) AS assigned_staff
    FROM tasks t
    LEFT JOIN task_assignments ta ON ta.task_id = t.task_id
    LEFT JOIN users u ON u.user_id = ta.staff_id
"#;

const TASK_GROUP: &str = " GROUP BY t.task_id ";

const NEWEST_FIRST: &str = " ORDER BY t.created_at DESC, t.task_id DESC";

impl Task {
    /// All tasks, newest first
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!("{TASK_SELECT}{TASK_GROUP}{NEWEST_FIRST}");

        sqlx::query_as::<_, Task>(&query).fetch_all(pool).await
    }

    /// Tasks the given user is assigned to, with all of their assignees
    pub async fn list_assigned_to(pool: &PgPool, staff_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "{TASK_SELECT} WHERE t.task_id IN \
             (SELECT task_id FROM task_assignments WHERE staff_id = $1)\
             {TASK_GROUP}{NEWEST_FIRST}"
        );

        sqlx::query_as::<_, Task>(&query)
            .bind(staff_id)
            .fetch_all(pool)
            .await
    }

    /// Tasks currently in `status`
    pub async fn list_by_status(
        pool: &PgPool,
        status: TaskStatus,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!("{TASK_SELECT} WHERE t.status = $1{TASK_GROUP}{NEWEST_FIRST}");

        sqlx::query_as::<_, Task>(&query)
            .bind(status)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        task_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("{TASK_SELECT} WHERE t.task_id = $1{TASK_GROUP}");

        sqlx::query_as::<_, Task>(&query)
            .bind(task_id)
            .fetch_optional(executor)
            .await
    }

    /// Reads the current status and locks the row until the transaction ends
    pub async fn lock_status(
        tx: &mut Transaction<'_, Postgres>,
        task_id: i64,
    ) -> Result<Option<TaskStatus>, sqlx::Error> {
        sqlx::query_scalar("SELECT status FROM tasks WHERE task_id = $1 FOR UPDATE")
            .bind(task_id)
            .fetch_optional(&mut **tx)
            .await
    }

    pub async fn status_of(pool: &PgPool, task_id: i64) -> Result<Option<TaskStatus>, sqlx::Error> {
        sqlx::query_scalar("SELECT status FROM tasks WHERE task_id = $1")
            .bind(task_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn is_assignee(pool: &PgPool, task_id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM task_assignments WHERE task_id = $1 AND staff_id = $2
            )
            "#,
        )
        .bind(task_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Moves a task from `from` to `to`
    ///
    /// Returns `false` if the task no longer has status `from`, which happens
    /// when a concurrent update won.
    pub async fn transition<'e, E: PgExecutor<'e>>(
        executor: E,
        task_id: i64,
        from: TaskStatus,
        to: TaskStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE tasks SET status = $3 WHERE task_id = $1 AND status = $2")
            .bind(task_id)
            .bind(from)
            .bind(to)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Inserts the task row; assignments are written separately
    pub async fn insert<'e, E: PgExecutor<'e>>(
        executor: E,
        data: CreateTask,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            INSERT INTO tasks (title, description, task_type, due_date, assigned_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING task_id
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.task_type)
        .bind(data.due_date)
        .bind(data.assigned_by)
        .fetch_one(executor)
        .await
    }

    /// Applies a partial update; returns `false` if the task does not exist
    pub async fn update<'e, E: PgExecutor<'e>>(
        executor: E,
        task_id: i64,
        data: UpdateTask,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET title = COALESCE($1, title),
                description = COALESCE($2, description),
                task_type = COALESCE($3, task_type),
                status = COALESCE($4, status),
                due_date = COALESCE($5, due_date)
            WHERE task_id = $6
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.task_type)
        .bind(data.status)
        .bind(data.due_date)
        .bind(task_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Replaces the assignment set of a task
    pub async fn replace_assignments(
        tx: &mut Transaction<'_, Postgres>,
        task_id: i64,
        staff_ids: &[i64],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM task_assignments WHERE task_id = $1")
            .bind(task_id)
            .execute(&mut **tx)
            .await?;

        if staff_ids.is_empty() {
            return Ok(());
        }

        sqlx::query(
            r#"
            INSERT INTO task_assignments (task_id, staff_id)
            SELECT $1, staff_id FROM UNNEST($2::BIGINT[]) AS staff_id
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(task_id)
        .bind(staff_ids)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Deletes a task; assignments and reviews cascade
    pub async fn delete(pool: &PgPool, task_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE task_id = $1")
            .bind(task_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
