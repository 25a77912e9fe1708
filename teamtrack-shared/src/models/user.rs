//! User model and database operations
//!
//! Every user holds exactly one role and at most one department. Passwords are
//! stored as Argon2id hashes and never leave this module in serialized form.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE users (
//!     user_id BIGSERIAL PRIMARY KEY,
//!     username VARCHAR(100) NOT NULL UNIQUE,
//!     password_hash VARCHAR(255) NOT NULL,
//!     full_name VARCHAR(255) NOT NULL,
//!     email VARCHAR(255) NOT NULL,
//!     role_id BIGINT NOT NULL REFERENCES roles(role_id) ON DELETE RESTRICT,
//!     department_id BIGINT REFERENCES departments(department_id) ON DELETE RESTRICT,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};

use crate::auth::identity::STAFF_ROLE;

/// User row as stored
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub user_id: i64,

    pub username: String,

    /// Argon2id hash, never serialized
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    pub full_name: String,

    pub email: String,

    pub role_id: i64,

    pub department_id: Option<i64>,

    pub created_at: DateTime<Utc>,
}

/// User joined with its role and department names
///
/// This is the shape returned to clients and the source of token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
    pub user_id: i64,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub role_id: i64,
    pub role: String,
    pub department_id: Option<i64>,
    pub department: Option<String>,
}

/// Profile plus stored hash, used only by login
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserCredentials {
    #[sqlx(flatten)]
    pub profile: UserProfile,
    pub password_hash: String,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,

    pub full_name: String,
    pub email: String,
    pub role_id: i64,
    pub department_id: Option<i64>,
}

/// Partial update; `None` leaves a column unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role_id: Option<i64>,
    pub department_id: Option<i64>,
}

const PROFILE_SELECT: &str = r#"
    SELECT u.user_id, u.username, u.full_name, u.email,
           u.role_id, r.role_name AS role,
           u.department_id, d.department_name AS department
    FROM users u
    JOIN roles r ON r.role_id = u.role_id
    LEFT JOIN departments d ON d.department_id = u.department_id
"#;

impl User {
    /// Inserts a user
    ///
    /// # Errors
    ///
    /// Fails on a duplicate username or an unknown role/department id.
    pub async fn create<'e, E: PgExecutor<'e>>(
        executor: E,
        data: CreateUser,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, full_name, email, role_id, department_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING user_id, username, password_hash, full_name, email,
                      role_id, department_id, created_at
            "#,
        )
        .bind(data.username)
        .bind(data.password_hash)
        .bind(data.full_name)
        .bind(data.email)
        .bind(data.role_id)
        .bind(data.department_id)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, user_id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, username, password_hash, full_name, email,
                   role_id, department_id, created_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Looks up login credentials by exact username
    pub async fn find_credentials(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<UserCredentials>, sqlx::Error> {
        sqlx::query_as::<_, UserCredentials>(
            r#"
            SELECT u.user_id, u.username, u.full_name, u.email,
                   u.role_id, r.role_name AS role,
                   u.department_id, d.department_name AS department,
                   u.password_hash
            FROM users u
            JOIN roles r ON r.role_id = u.role_id
            LEFT JOIN departments d ON d.department_id = u.department_id
            WHERE u.username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_profile(
        pool: &PgPool,
        user_id: i64,
    ) -> Result<Option<UserProfile>, sqlx::Error> {
        let query = format!("{PROFILE_SELECT} WHERE u.user_id = $1");

        sqlx::query_as::<_, UserProfile>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// All users ordered by id
    pub async fn list_profiles(pool: &PgPool) -> Result<Vec<UserProfile>, sqlx::Error> {
        let query = format!("{PROFILE_SELECT} ORDER BY u.user_id ASC");

        sqlx::query_as::<_, UserProfile>(&query)
            .fetch_all(pool)
            .await
    }

    /// Applies a partial update, returning the updated profile
    ///
    /// Returns `None` if the user does not exist.
    pub async fn update(
        pool: &PgPool,
        user_id: i64,
        data: UpdateUser,
    ) -> Result<Option<UserProfile>, sqlx::Error> {
        let updated: Option<(i64,)> = sqlx::query_as(
            r#"
            UPDATE users
            SET full_name = COALESCE($1, full_name),
                email = COALESCE($2, email),
                role_id = COALESCE($3, role_id),
                department_id = COALESCE($4, department_id)
            WHERE user_id = $5
            RETURNING user_id
            "#,
        )
        .bind(data.full_name)
        .bind(data.email)
        .bind(data.role_id)
        .bind(data.department_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        match updated {
            Some(_) => Self::find_profile(pool, user_id).await,
            None => Ok(None),
        }
    }

    /// Replaces the stored password hash
    pub async fn update_password(
        pool: &PgPool,
        user_id: i64,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET password_hash = $1 WHERE user_id = $2")
            .bind(password_hash)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a user; their task assignments cascade
    pub async fn delete(pool: &PgPool, user_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count<'e, E: PgExecutor<'e>>(executor: E) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(executor)
            .await
    }

    /// Of the given ids, returns those that belong to users holding the Staff role
    pub async fn filter_staff<'e, E: PgExecutor<'e>>(
        executor: E,
        user_ids: &[i64],
    ) -> Result<Vec<i64>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT u.user_id
            FROM users u
            JOIN roles r ON r.role_id = u.role_id
            WHERE u.user_id = ANY($1) AND r.role_name = $2
            ORDER BY u.user_id
            "#,
        )
        .bind(user_ids)
        .bind(STAFF_ROLE)
        .fetch_all(executor)
        .await
    }
}
