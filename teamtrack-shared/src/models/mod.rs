//! Database models for TeamTrack
//!
//! Each model owns its SQL. Functions take `&PgPool` when they stand alone and
//! a generic `PgExecutor` when services need to run them inside a transaction.
//!
//! # Models
//!
//! - `user`: user accounts, profiles and credentials
//! - `role`: roles (open set, `Admin` protected)
//! - `department`: departments (open set, `QA` protected)
//! - `task`: tasks, their status machine and assignments
//! - `review`: QA review history
//! - `metrics`: per-user counts and global efficiency

pub mod department;
pub mod metrics;
pub mod review;
pub mod role;
pub mod task;
pub mod user;
