//! Database layer
//!
//! - `pool`: PostgreSQL connection pool with a startup health check
//! - `migrations`: embedded schema migrations from the workspace `migrations/` directory
//! - `bootstrap`: first-run creation of the initial Admin account
//!
//! Models live in the crate-level `models` module.

pub mod bootstrap;
pub mod migrations;
pub mod pool;
