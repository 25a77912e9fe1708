//! First-run bootstrap
//!
//! Roles and departments are seeded by migrations. A fresh database has no
//! users, so nobody could log in to create one; when bootstrap credentials are
//! configured, an Admin account is created on the first start.

use anyhow::Context;
use sqlx::PgPool;

use crate::auth::identity::ADMIN_ROLE;
use crate::auth::password::hash_password_async;
use crate::models::role::RoleRecord;
use crate::models::user::{CreateUser, User};

/// Credentials for the initial Admin account
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
}

/// Creates the initial Admin when the users table is empty
///
/// Returns the new user's id, or `None` if users already exist.
#[tracing::instrument(skip(pool, admin), fields(username = %admin.username), err)]
pub async fn ensure_admin(pool: &PgPool, admin: &BootstrapAdmin) -> anyhow::Result<Option<i64>> {
    let count = User::count(pool).await.context("counting users")?;

    if count > 0 {
        tracing::debug!(count, "bootstrap skipped, users already exist");
        return Ok(None);
    }

    let role = RoleRecord::find_by_name(pool, ADMIN_ROLE)
        .await?
        .context("Admin role missing, were migrations run?")?;

    let password_hash = hash_password_async(admin.password.clone()).await?;

    let user = User::create(
        pool,
        CreateUser {
            username: admin.username.clone(),
            password_hash,
            full_name: "Administrator".to_string(),
            email: format!("{}@localhost", admin.username),
            role_id: role.role_id,
            department_id: None,
        },
    )
    .await
    .context("creating bootstrap admin")?;

    tracing::info!(user_id = user.user_id, "bootstrap admin created");

    Ok(Some(user.user_id))
}
