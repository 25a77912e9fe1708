//! Role model and database operations
//!
//! Roles are an open set managed by Admins. The built-in `Admin` role cannot be
//! renamed or deleted, otherwise nobody could administer the system.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::identity::ADMIN_ROLE;

/// Role row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RoleRecord {
    pub role_id: i64,
    pub role_name: String,
    pub description: Option<String>,
}

/// Input for creating a role
#[derive(Debug, Clone)]
pub struct CreateRole {
    pub role_name: String,
    pub description: Option<String>,
}

/// Partial role update
#[derive(Debug, Clone, Default)]
pub struct UpdateRole {
    pub role_name: Option<String>,
    pub description: Option<String>,
}

impl RoleRecord {
    /// Whether this is a built-in role that must survive
    pub fn is_protected(&self) -> bool {
        self.role_name == ADMIN_ROLE
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, RoleRecord>(
            "SELECT role_id, role_name, description FROM roles ORDER BY role_id ASC",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, role_id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, RoleRecord>(
            "SELECT role_id, role_name, description FROM roles WHERE role_id = $1",
        )
        .bind(role_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_name(pool: &PgPool, role_name: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, RoleRecord>(
            "SELECT role_id, role_name, description FROM roles WHERE role_name = $1",
        )
        .bind(role_name)
        .fetch_optional(pool)
        .await
    }

    /// # Errors
    ///
    /// Fails with a unique violation if the name is taken.
    pub async fn create(pool: &PgPool, data: CreateRole) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, RoleRecord>(
            r#"
            INSERT INTO roles (role_name, description)
            VALUES ($1, $2)
            RETURNING role_id, role_name, description
            "#,
        )
        .bind(data.role_name)
        .bind(data.description)
        .fetch_one(pool)
        .await
    }

    /// Applies a partial update
    ///
    /// The Admin role keeps its name: the guard in the WHERE clause makes a
    /// rename of it affect no rows.
    pub async fn update(
        pool: &PgPool,
        role_id: i64,
        data: UpdateRole,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, RoleRecord>(
            r#"
            UPDATE roles
            SET role_name = COALESCE($1, role_name),
                description = COALESCE($2, description)
            WHERE role_id = $3
              AND (role_name <> $4 OR $1 IS NULL OR $1 = $4)
            RETURNING role_id, role_name, description
            "#,
        )
        .bind(data.role_name)
        .bind(data.description)
        .bind(role_id)
        .bind(ADMIN_ROLE)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a role unless it is the Admin role
    ///
    /// Fails with a foreign key violation while users still hold the role.
    pub async fn delete(pool: &PgPool, role_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM roles WHERE role_id = $1 AND role_name <> $2")
            .bind(role_id)
            .bind(ADMIN_ROLE)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
