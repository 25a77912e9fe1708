//! # TeamTrack Shared Library
//!
//! Domain types, persistence and policy used by the TeamTrack API server.
//!
//! ## Module Organization
//!
//! - `auth`: credentials, per-request identity and the authorization gate
//! - `db`: connection pool, migrations and first-run bootstrap
//! - `models`: database models (users, roles, departments, tasks, reviews, metrics)
//! - `service`: the task workflow and directory operations exposed to the API

pub mod auth;
pub mod db;
pub mod models;
pub mod service;

/// Current version of the TeamTrack shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
