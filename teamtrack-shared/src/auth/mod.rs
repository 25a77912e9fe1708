//! Authentication and authorization
//!
//! # Modules
//!
//! - [`password`]: Argon2id password hashing and validation
//! - [`jwt`]: session token issuance and validation
//! - [`identity`]: the caller identity resolved once per request
//! - [`authorization`]: the central allow/deny decision for every operation
//!
//! A request is authenticated by validating its bearer token into [`jwt::Claims`],
//! turned into an immutable [`identity::Identity`], and every operation is then
//! checked with [`authorization::authorize`] before touching storage.

pub mod authorization;
pub mod identity;
pub mod jwt;
pub mod password;
