//! Configuration management for the API server
//!
//! Configuration is read from environment variables, with a `.env` file
//! loaded first when present (for development).
//!
//! # Environment Variables
//!
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
//! - `API_HOST`: host to bind to (default: 0.0.0.0)
//! - `API_PORT`: port to bind to (default: 5000)
//! - `JWT_SECRET`: token signing secret, at least 32 characters (required)
//! - `JWT_EXPIRY_HOURS`: session lifetime (default: 2)
//! - `CORS_ORIGINS`: comma-separated allowed origins, `*` for any (default: `*`)
//! - `PRODUCTION`: enables HSTS (default: false)
//! - `DEFAULT_USER_PASSWORD`: initial password of Admin-created users (default: 1234567)
//! - `BOOTSTRAP_ADMIN_USERNAME` / `BOOTSTRAP_ADMIN_PASSWORD`: first-run Admin account
//! - `LOG_FORMAT`: `json` for JSON logs, anything else for human-readable
//! - `RUST_LOG`: log filter

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use teamtrack_shared::auth::jwt::DEFAULT_EXPIRY_HOURS;
use teamtrack_shared::db::bootstrap::BootstrapAdmin;

/// Initial password given to users created by an Admin
pub const DEFAULT_USER_PASSWORD: &str = "1234567";

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// User provisioning
    pub users: UsersConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; empty or `*` allows any
    pub cors_origins: Vec<String>,

    /// Production mode (adds HSTS)
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// IMPORTANT: This must be kept secret and should be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    #[serde(skip_serializing)]
    pub secret: String,

    /// Session lifetime in hours
    pub expiry_hours: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersConfig {
    /// Password assigned to Admin-created users
    #[serde(skip_serializing)]
    pub default_password: String,

    pub bootstrap_admin_username: Option<String>,

    #[serde(skip_serializing)]
    pub bootstrap_admin_password: Option<String>,
}

impl UsersConfig {
    /// First-run Admin credentials, when both halves are configured
    pub fn bootstrap_admin(&self) -> Option<BootstrapAdmin> {
        match (&self.bootstrap_admin_username, &self.bootstrap_admin_password) {
            (Some(username), Some(password)) => Some(BootstrapAdmin {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T, name: &str) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{} has an invalid value {:?}: {}", name, raw, e)),
        None => Ok(default),
    }
}

fn parse_bool(value: Option<String>) -> bool {
    matches!(
        value.as_deref().map(str::trim),
        Some("1") | Some("true") | Some("TRUE") | Some("True") | Some("yes")
    )
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing
    /// - Environment variables have invalid values
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let api_port = parse_or(lookup("API_PORT"), 5000u16, "API_PORT")?;

        let cors_origins = lookup("CORS_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = parse_or(lookup("DATABASE_MAX_CONNECTIONS"), 10u32, "DATABASE_MAX_CONNECTIONS")?;

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let expiry_hours = parse_or(lookup("JWT_EXPIRY_HOURS"), DEFAULT_EXPIRY_HOURS, "JWT_EXPIRY_HOURS")?;
        if expiry_hours <= 0 {
            anyhow::bail!("JWT_EXPIRY_HOURS must be positive");
        }

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
                production: parse_bool(lookup("PRODUCTION")),
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                expiry_hours,
            },
            users: UsersConfig {
                default_password: non_empty(lookup("DEFAULT_USER_PASSWORD"))
                    .unwrap_or_else(|| DEFAULT_USER_PASSWORD.to_string()),
                bootstrap_admin_username: non_empty(lookup("BOOTSTRAP_ADMIN_USERNAME")),
                bootstrap_admin_password: non_empty(lookup("BOOTSTRAP_ADMIN_PASSWORD")),
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Whether any origin may call the API
    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.is_empty() || self.api.cors_origins.iter().any(|o| o == "*")
    }
}
