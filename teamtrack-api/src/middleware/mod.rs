//! Middleware for the API server
//!
//! - `auth`: bearer token validation and per-request identity
//! - `security`: security response headers

pub mod auth;
pub mod security;
