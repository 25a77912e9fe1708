//! Task operations
//!
//! Admins create, edit, reassign and delete tasks. Staff move their own tasks
//! along the transition table in [`TaskStatus::staff_can_transition_to`].

use chrono::NaiveDate;
use sqlx::PgPool;
use std::collections::BTreeSet;

use super::visibility::TaskScope;
use super::{ServiceError, ServiceResult};
use crate::auth::authorization::{authorize, Operation};
use crate::auth::identity::Identity;
use crate::models::task::{CreateTask, Task, TaskStatus, TaskType, UpdateTask};
use crate::models::user::User;

/// A task as submitted for creation
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub task_type: TaskType,
    pub due_date: Option<NaiveDate>,
    pub assigned_to: Vec<i64>,
}

/// Admin edit; every `None` field is left unchanged
#[derive(Debug, Clone, Default)]
pub struct TaskEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub task_type: Option<TaskType>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<NaiveDate>,

    /// Replaces the assignment set when present
    pub assigned_to: Option<Vec<i64>>,
}

/// Tasks visible to the caller, newest first
pub async fn list_tasks(pool: &PgPool, identity: &Identity) -> ServiceResult<Vec<Task>> {
    let scope = TaskScope::for_identity(identity);
    let tasks = scope.load(pool).await?;

    tracing::debug!(
        user_id = identity.user_id,
        scope = ?scope,
        count = tasks.len(),
        "Listed tasks"
    );

    Ok(tasks)
}

/// A single task, reported as not found when outside the caller's scope
pub async fn get_task(pool: &PgPool, identity: &Identity, task_id: i64) -> ServiceResult<Task> {
    Task::find_by_id(pool, task_id)
        .await?
        .filter(|task| TaskScope::for_identity(identity).admits(task))
        .ok_or(ServiceError::NotFound("Task"))
}

/// Deduplicates assignees and checks them against the task type
fn normalize_assignees(task_type: TaskType, assigned_to: &[i64]) -> ServiceResult<Vec<i64>> {
    let unique: Vec<i64> = assigned_to
        .iter()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    if let Some(max) = task_type.max_assignees() {
        if unique.len() > max {
            return Err(ServiceError::InvalidInput(
                "Individual tasks can have at most one assignee".to_string(),
            ));
        }
    }

    Ok(unique)
}

fn normalize_title(title: &str) -> ServiceResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ServiceError::InvalidInput("Title must not be empty".to_string()));
    }
    Ok(title.to_string())
}

/// Fails unless every id belongs to a user holding the Staff role
async fn ensure_staff<'e, E: sqlx::PgExecutor<'e>>(executor: E, ids: &[i64]) -> ServiceResult<()> {
    if ids.is_empty() {
        return Ok(());
    }

    let staff = User::filter_staff(executor, ids).await?;
    let missing: Vec<String> = ids
        .iter()
        .filter(|&&id| !staff.contains(&id))
        .map(|id| id.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::InvalidInput(format!(
            "Assignees must be Staff users: {}",
            missing.join(", ")
        )))
    }
}

/// Creates a task in `Pending` together with its assignments
pub async fn create_task(
    pool: &PgPool,
    identity: &Identity,
    draft: TaskDraft,
) -> ServiceResult<Task> {
    authorize(identity, Operation::ManageTasks)?;

    let title = normalize_title(&draft.title)?;
    let assignees = normalize_assignees(draft.task_type, &draft.assigned_to)?;

    let mut tx = pool.begin().await?;

    ensure_staff(&mut *tx, &assignees).await?;

    let task_id = Task::insert(
        &mut *tx,
        CreateTask {
            title,
            description: draft.description,
            task_type: draft.task_type,
            due_date: draft.due_date,
            assigned_by: identity.user_id,
        },
    )
    .await?;

    Task::replace_assignments(&mut tx, task_id, &assignees).await?;

    let task = Task::find_by_id(&mut *tx, task_id)
        .await?
        .ok_or(ServiceError::NotFound("Task"))?;

    tx.commit().await?;

    tracing::info!(
        task_id,
        created_by = identity.user_id,
        assignees = ?assignees,
        "Task created"
    );

    Ok(task)
}

/// Admin edit and reassignment
///
/// Status changes made here bypass the transition table.
pub async fn edit_task(
    pool: &PgPool,
    identity: &Identity,
    task_id: i64,
    edit: TaskEdit,
) -> ServiceResult<Task> {
    authorize(identity, Operation::ManageTasks)?;

    let title = edit.title.as_deref().map(normalize_title).transpose()?;

    let mut tx = pool.begin().await?;

    let current = Task::find_by_id(&mut *tx, task_id)
        .await?
        .ok_or(ServiceError::NotFound("Task"))?;

    let task_type = edit.task_type.unwrap_or(current.task_type);
    let assignees = match &edit.assigned_to {
        Some(ids) => Some(normalize_assignees(task_type, ids)?),
        None => {
            normalize_assignees(task_type, &current.assignee_ids)?;
            None
        }
    };

    if let Some(ids) = &assignees {
        ensure_staff(&mut *tx, ids).await?;
    }

    Task::update(
        &mut *tx,
        task_id,
        UpdateTask {
            title,
            description: edit.description,
            task_type: edit.task_type,
            status: edit.status,
            due_date: edit.due_date,
        },
    )
    .await?;

    if let Some(ids) = &assignees {
        Task::replace_assignments(&mut tx, task_id, ids).await?;
    }

    let task = Task::find_by_id(&mut *tx, task_id)
        .await?
        .ok_or(ServiceError::NotFound("Task"))?;

    tx.commit().await?;

    tracing::info!(
        task_id,
        edited_by = identity.user_id,
        status = %task.status,
        reassigned = assignees.is_some(),
        "Task edited"
    );

    Ok(task)
}

/// Staff status update along the transition table
pub async fn update_task_status(
    pool: &PgPool,
    identity: &Identity,
    task_id: i64,
    new_status: &str,
) -> ServiceResult<Task> {
    // Non-Staff callers are denied before the task is looked up
    if !identity.is_staff() {
        authorize(identity, Operation::UpdateTaskStatus { is_assignee: false })?;
    }

    let current = Task::status_of(pool, task_id)
        .await?
        .ok_or(ServiceError::NotFound("Task"))?;

    let is_assignee = Task::is_assignee(pool, task_id, identity.user_id).await?;
    authorize(identity, Operation::UpdateTaskStatus { is_assignee })?;

    let target = new_status
        .parse::<TaskStatus>()
        .map_err(|e| ServiceError::InvalidInput(e.to_string()))?;

    if !current.staff_can_transition_to(target) {
        return Err(ServiceError::InvalidTransition {
            from: current,
            to: target,
        });
    }

    if !Task::transition(pool, task_id, current, target).await? {
        // Another writer moved the task between our read and the update
        let now = Task::status_of(pool, task_id)
            .await?
            .ok_or(ServiceError::NotFound("Task"))?;
        return Err(ServiceError::InvalidTransition {
            from: now,
            to: target,
        });
    }

    tracing::info!(
        task_id,
        user_id = identity.user_id,
        from = %current,
        to = %target,
        "Task status updated"
    );

    Task::find_by_id(pool, task_id)
        .await?
        .ok_or(ServiceError::NotFound("Task"))
}

/// Deletes a task with its assignments and reviews
pub async fn delete_task(pool: &PgPool, identity: &Identity, task_id: i64) -> ServiceResult<()> {
    authorize(identity, Operation::ManageTasks)?;

    if !Task::delete(pool, task_id).await? {
        return Err(ServiceError::NotFound("Task"));
    }

    tracing::info!(task_id, deleted_by = identity.user_id, "Task deleted");

    Ok(())
}
