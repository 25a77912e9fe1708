//! Visibility filter
//!
//! | Caller | Sees |
//! |---|---|
//! | role Admin | every task |
//! | department QA (any other role) | tasks in `Ready for QA` |
//! | role Staff | tasks they are assigned to |
//! | anyone else | nothing |
//!
//! Rows are always fetched through the scope, never fetched and then filtered,
//! except for single-task reads where [`TaskScope::admits`] is applied to the
//! loaded task.

use sqlx::PgPool;

use crate::auth::identity::Identity;
use crate::models::task::{Task, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskScope {
    All,
    AssignedTo(i64),
    AwaitingReview,
    Nothing,
}

impl TaskScope {
    pub fn for_identity(identity: &Identity) -> Self {
        if identity.is_admin() {
            TaskScope::All
        } else if identity.in_qa_department() {
            TaskScope::AwaitingReview
        } else if identity.is_staff() {
            TaskScope::AssignedTo(identity.user_id)
        } else {
            TaskScope::Nothing
        }
    }

    /// Whether a loaded task falls inside the scope
    pub fn admits(&self, task: &Task) -> bool {
        match self {
            TaskScope::All => true,
            TaskScope::AssignedTo(user_id) => task.assignee_ids.contains(user_id),
            TaskScope::AwaitingReview => task.status == TaskStatus::ReadyForQa,
            TaskScope::Nothing => false,
        }
    }

    /// Loads the tasks in scope, newest first
    pub async fn load(&self, pool: &PgPool) -> Result<Vec<Task>, sqlx::Error> {
        match self {
            TaskScope::All => Task::list_all(pool).await,
            TaskScope::AssignedTo(user_id) => Task::list_assigned_to(pool, *user_id).await,
            TaskScope::AwaitingReview => Task::list_by_status(pool, TaskStatus::ReadyForQa).await,
            TaskScope::Nothing => Ok(Vec::new()),
        }
    }
}
