//! Department model and database operations
//!
//! The `QA` department is built in: its members review tasks, so it cannot be
//! renamed or deleted.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::identity::QA_DEPARTMENT;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DepartmentRecord {
    pub department_id: i64,
    pub department_name: String,
}

impl DepartmentRecord {
    pub fn is_protected(&self) -> bool {
        self.department_name == QA_DEPARTMENT
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, DepartmentRecord>(
            "SELECT department_id, department_name FROM departments ORDER BY department_id ASC",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        department_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, DepartmentRecord>(
            "SELECT department_id, department_name FROM departments WHERE department_id = $1",
        )
        .bind(department_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(pool: &PgPool, department_name: &str) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, DepartmentRecord>(
            r#"
            INSERT INTO departments (department_name)
            VALUES ($1)
            RETURNING department_id, department_name
            "#,
        )
        .bind(department_name)
        .fetch_one(pool)
        .await
    }

    /// Renames a department; the QA department is never renamed
    pub async fn rename(
        pool: &PgPool,
        department_id: i64,
        department_name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, DepartmentRecord>(
            r#"
            UPDATE departments
            SET department_name = $1
            WHERE department_id = $2
              AND (department_name <> $3 OR $1 = $3)
            RETURNING department_id, department_name
            "#,
        )
        .bind(department_name)
        .bind(department_id)
        .bind(QA_DEPARTMENT)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a department unless it is QA
    ///
    /// Fails with a foreign key violation while users still belong to it.
    pub async fn delete(pool: &PgPool, department_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM departments WHERE department_id = $1 AND department_name <> $2",
        )
        .bind(department_id)
        .bind(QA_DEPARTMENT)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
