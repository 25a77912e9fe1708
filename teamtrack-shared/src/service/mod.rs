//! Service operations
//!
//! Each operation takes the caller's [`Identity`](crate::auth::identity::Identity),
//! asks the authorization gate first, then reads and writes through the models.
//! Multi-step writes run in a single transaction.
//!
//! - `account`: login and password changes
//! - `directory`: users, roles and departments
//! - `tasks`: task listing, creation, editing and status updates
//! - `reviews`: the QA queue and review submission
//! - `metrics`: per-user and global metrics
//! - `visibility`: which tasks a caller may see

pub mod account;
pub mod directory;
pub mod metrics;
pub mod reviews;
pub mod tasks;
pub mod visibility;

use crate::auth::authorization::AuthzError;
use crate::auth::password::PasswordError;
use crate::models::task::TaskStatus;

/// Error type for service operations
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The authorization gate refused the operation
    #[error(transparent)]
    Denied(#[from] AuthzError),

    /// Unknown username or wrong password
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// The targeted entity does not exist (or is not visible to the caller)
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The requested status change is not in the transition table
    #[error("Cannot change task status from {from} to {to}")]
    InvalidTransition { from: TaskStatus, to: TaskStatus },

    /// The operation would break a built-in invariant
    #[error("{0}")]
    Protected(String),

    /// The request is well-formed but semantically invalid
    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
