//! # TeamTrack API Server Library
//!
//! HTTP surface of the TeamTrack task tracker. Policy and persistence live in
//! `teamtrack-shared`; this crate maps requests onto it.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Environment configuration
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Bearer authentication and security headers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
