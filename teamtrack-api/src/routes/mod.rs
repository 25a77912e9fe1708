//! API route handlers
//!
//! This module contains all route handlers organized by resource:
//!
//! - `health`: Health check endpoint
//! - `auth`: Login, current profile, password change
//! - `users`, `roles`, `departments`: Directory management (Admin)
//! - `tasks`: Task lifecycle
//! - `qa`: QA review queue, decisions and history
//! - `metrics`: Per-user and global metrics

pub mod auth;
pub mod departments;
pub mod health;
pub mod metrics;
pub mod qa;
pub mod roles;
pub mod tasks;
pub mod users;
