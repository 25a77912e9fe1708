//! Authorization gate
//!
//! Every operation a caller can request is named by an [`Operation`] and decided
//! by [`authorize`]. Handlers never inspect roles or departments themselves.
//!
//! # Rules
//!
//! | Operation | Allowed when |
//! |---|---|
//! | `ManageDirectory` | role is Admin |
//! | `ManageTasks` | role is Admin |
//! | `UpdateTaskStatus` | role is Staff and the caller is assigned to the task |
//! | `ReviewTasks` | department is QA |
//! | `ViewReviewHistory` | department is QA, or role is Admin |
//! | `ViewGlobalMetrics` | role is Admin |
//! | `ViewUserMetrics` | the caller is the requested user, or role is Admin |
//! | `ChangePassword` | the caller is the target user |
//!
//! A denial never says which rule failed.

use super::identity::Identity;

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    #[error("access denied")]
    AccessDenied,
}

/// An action a caller asks to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Create, edit, list or delete users, roles and departments
    ManageDirectory,

    /// Create, edit, reassign or delete tasks
    ManageTasks,

    /// Move a task along the staff transitions
    UpdateTaskStatus {
        /// Whether the caller is one of the task's assignees
        is_assignee: bool,
    },

    /// List tasks awaiting review and submit QA decisions
    ReviewTasks,

    /// Read the QA review history of a task
    ViewReviewHistory,

    /// Read aggregate metrics across all users
    ViewGlobalMetrics,

    /// Read per-user task counts
    ViewUserMetrics { user_id: i64 },

    /// Change the password of a user
    ChangePassword { user_id: i64 },
}

/// Decides whether `identity` may perform `operation`
///
/// No storage access.
pub fn authorize(identity: &Identity, operation: Operation) -> Result<(), AuthzError> {
    let allowed = match operation {
        Operation::ManageDirectory | Operation::ManageTasks | Operation::ViewGlobalMetrics => {
            identity.is_admin()
        }
        Operation::UpdateTaskStatus { is_assignee } => identity.is_staff() && is_assignee,
        Operation::ReviewTasks => identity.in_qa_department(),
        Operation::ViewReviewHistory => identity.in_qa_department() || identity.is_admin(),
        Operation::ViewUserMetrics { user_id } => identity.user_id == user_id || identity.is_admin(),
        Operation::ChangePassword { user_id } => identity.user_id == user_id,
    };

    if allowed {
        Ok(())
    } else {
        tracing::warn!(
            user_id = identity.user_id,
            role = %identity.role,
            operation = ?operation,
            "Access denied"
        );
        Err(AuthzError::AccessDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::identity::{Department, Role};

    fn admin() -> Identity {
        Identity::new(1, Role::Admin, None)
    }

    fn staff() -> Identity {
        Identity::new(2, Role::Staff, Some(Department::Other("Engineering".to_string())))
    }

    fn qa() -> Identity {
        Identity::new(3, Role::Qa, Some(Department::Qa))
    }

    fn contractor() -> Identity {
        Identity::new(4, Role::Other("Contractor".to_string()), None)
    }

    #[test]
    fn test_admin_only_operations() {
        for op in [
            Operation::ManageDirectory,
            Operation::ManageTasks,
            Operation::ViewGlobalMetrics,
        ] {
            assert!(authorize(&admin(), op).is_ok());
            assert_eq!(authorize(&staff(), op), Err(AuthzError::AccessDenied));
            assert_eq!(authorize(&qa(), op), Err(AuthzError::AccessDenied));
            assert_eq!(authorize(&contractor(), op), Err(AuthzError::AccessDenied));
        }
    }

    #[test]
    fn test_role_match_is_case_sensitive() {
        let lowercase_admin = Identity::new(5, Role::parse("admin"), None);
        assert!(authorize(&lowercase_admin, Operation::ManageTasks).is_err());
    }

    #[test]
    fn test_update_status_requires_staff_assignee() {
        assert!(authorize(&staff(), Operation::UpdateTaskStatus { is_assignee: true }).is_ok());
        assert!(authorize(&staff(), Operation::UpdateTaskStatus { is_assignee: false }).is_err());
        assert!(authorize(&admin(), Operation::UpdateTaskStatus { is_assignee: true }).is_err());
        assert!(authorize(&qa(), Operation::UpdateTaskStatus { is_assignee: true }).is_err());
    }

    #[test]
    fn test_review_is_decided_by_department() {
        assert!(authorize(&qa(), Operation::ReviewTasks).is_ok());

        let staff_in_qa = Identity::new(6, Role::Staff, Some(Department::Qa));
        assert!(authorize(&staff_in_qa, Operation::ReviewTasks).is_ok());

        let qa_role_elsewhere = Identity::new(7, Role::Qa, None);
        assert!(authorize(&qa_role_elsewhere, Operation::ReviewTasks).is_err());

        assert!(authorize(&admin(), Operation::ReviewTasks).is_err());
    }

    #[test]
    fn test_review_history() {
        assert!(authorize(&qa(), Operation::ViewReviewHistory).is_ok());
        assert!(authorize(&admin(), Operation::ViewReviewHistory).is_ok());
        assert!(authorize(&staff(), Operation::ViewReviewHistory).is_err());
    }

    #[test]
    fn test_user_metrics_self_or_admin() {
        assert!(authorize(&staff(), Operation::ViewUserMetrics { user_id: 2 }).is_ok());
        assert!(authorize(&staff(), Operation::ViewUserMetrics { user_id: 3 }).is_err());
        assert!(authorize(&admin(), Operation::ViewUserMetrics { user_id: 3 }).is_ok());
    }

    #[test]
    fn test_change_password_self_only() {
        assert!(authorize(&staff(), Operation::ChangePassword { user_id: 2 }).is_ok());
        assert!(authorize(&admin(), Operation::ChangePassword { user_id: 2 }).is_err());
    }

    #[test]
    fn test_denial_message_is_generic() {
        let err = authorize(&staff(), Operation::ManageDirectory).unwrap_err();
        assert_eq!(err.to_string(), "access denied");
    }
}
