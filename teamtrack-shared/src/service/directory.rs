//! Directory management: users, roles and departments
//!
//! Every operation here is Admin-only. The Admin role, the QA department and
//! the calling Admin's own account are protected from deletion; the model
//! layer repeats the role and department guards in SQL.

use sqlx::PgPool;

use super::{ServiceError, ServiceResult};
use crate::auth::authorization::{authorize, Operation};
use crate::auth::identity::Identity;
use crate::auth::password::hash_password_async;
use crate::models::department::DepartmentRecord;
use crate::models::role::{CreateRole, RoleRecord, UpdateRole};
use crate::models::user::{CreateUser, UpdateUser, User, UserProfile};

/// A user as submitted by an Admin
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub role_id: i64,
    pub department_id: Option<i64>,
}

fn required(field: &str, value: &str) -> ServiceResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ServiceError::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(value.to_string())
}

async fn ensure_references(
    pool: &PgPool,
    role_id: Option<i64>,
    department_id: Option<i64>,
) -> ServiceResult<()> {
    if let Some(role_id) = role_id {
        if RoleRecord::find_by_id(pool, role_id).await?.is_none() {
            return Err(ServiceError::InvalidInput(format!("Unknown role: {role_id}")));
        }
    }

    if let Some(department_id) = department_id {
        if DepartmentRecord::find_by_id(pool, department_id).await?.is_none() {
            return Err(ServiceError::InvalidInput(format!(
                "Unknown department: {department_id}"
            )));
        }
    }

    Ok(())
}

// Users

pub async fn list_users(pool: &PgPool, identity: &Identity) -> ServiceResult<Vec<UserProfile>> {
    authorize(identity, Operation::ManageDirectory)?;

    Ok(User::list_profiles(pool).await?)
}

/// Creates a user whose password is `initial_password`
pub async fn create_user(
    pool: &PgPool,
    identity: &Identity,
    new_user: NewUser,
    initial_password: &str,
) -> ServiceResult<UserProfile> {
    authorize(identity, Operation::ManageDirectory)?;

    let username = required("Username", &new_user.username)?;
    let full_name = required("Full name", &new_user.full_name)?;
    let email = required("Email", &new_user.email)?;

    ensure_references(pool, Some(new_user.role_id), new_user.department_id).await?;

    let password_hash = hash_password_async(initial_password.to_string()).await?;

    let user = User::create(
        pool,
        CreateUser {
            username,
            password_hash,
            full_name,
            email,
            role_id: new_user.role_id,
            department_id: new_user.department_id,
        },
    )
    .await?;

    tracing::info!(
        user_id = user.user_id,
        created_by = identity.user_id,
        "User created"
    );

    User::find_profile(pool, user.user_id)
        .await?
        .ok_or(ServiceError::NotFound("User"))
}

pub async fn update_user(
    pool: &PgPool,
    identity: &Identity,
    user_id: i64,
    mut update: UpdateUser,
) -> ServiceResult<UserProfile> {
    authorize(identity, Operation::ManageDirectory)?;

    update.full_name = update
        .full_name
        .as_deref()
        .map(|name| required("Full name", name))
        .transpose()?;
    update.email = update
        .email
        .as_deref()
        .map(|email| required("Email", email))
        .transpose()?;

    ensure_references(pool, update.role_id, update.department_id).await?;

    let profile = User::update(pool, user_id, update)
        .await?
        .ok_or(ServiceError::NotFound("User"))?;

    tracing::info!(user_id, updated_by = identity.user_id, "User updated");

    Ok(profile)
}

/// Deletes a user other than the caller; their assignments cascade
pub async fn delete_user(pool: &PgPool, identity: &Identity, user_id: i64) -> ServiceResult<()> {
    authorize(identity, Operation::ManageDirectory)?;

    if user_id == identity.user_id {
        return Err(ServiceError::Protected(
            "Admins cannot delete themselves".to_string(),
        ));
    }

    if !User::delete(pool, user_id).await? {
        return Err(ServiceError::NotFound("User"));
    }

    tracing::info!(user_id, deleted_by = identity.user_id, "User deleted");

    Ok(())
}

// Roles

pub async fn list_roles(pool: &PgPool, identity: &Identity) -> ServiceResult<Vec<RoleRecord>> {
    authorize(identity, Operation::ManageDirectory)?;

    Ok(RoleRecord::list(pool).await?)
}

pub async fn create_role(
    pool: &PgPool,
    identity: &Identity,
    role_name: &str,
    description: Option<String>,
) -> ServiceResult<RoleRecord> {
    authorize(identity, Operation::ManageDirectory)?;

    let role = RoleRecord::create(
        pool,
        CreateRole {
            role_name: required("Role name", role_name)?,
            description,
        },
    )
    .await?;

    tracing::info!(role_id = role.role_id, role_name = %role.role_name, "Role created");

    Ok(role)
}

pub async fn update_role(
    pool: &PgPool,
    identity: &Identity,
    role_id: i64,
    update: UpdateRole,
) -> ServiceResult<RoleRecord> {
    authorize(identity, Operation::ManageDirectory)?;

    let role_name = update
        .role_name
        .as_deref()
        .map(|name| required("Role name", name))
        .transpose()?;

    let current = RoleRecord::find_by_id(pool, role_id)
        .await?
        .ok_or(ServiceError::NotFound("Role"))?;

    if current.is_protected() && role_name.as_deref().is_some_and(|name| name != current.role_name) {
        return Err(ServiceError::Protected(
            "The Admin role cannot be renamed".to_string(),
        ));
    }

    let role = RoleRecord::update(
        pool,
        role_id,
        UpdateRole {
            role_name,
            description: update.description,
        },
    )
    .await?
    .ok_or(ServiceError::NotFound("Role"))?;

    tracing::info!(role_id, "Role updated");

    Ok(role)
}

/// Deletes a role no user holds; the Admin role is never deleted
pub async fn delete_role(pool: &PgPool, identity: &Identity, role_id: i64) -> ServiceResult<()> {
    authorize(identity, Operation::ManageDirectory)?;

    let role = RoleRecord::find_by_id(pool, role_id)
        .await?
        .ok_or(ServiceError::NotFound("Role"))?;

    if role.is_protected() {
        return Err(ServiceError::Protected(
            "The Admin role cannot be deleted".to_string(),
        ));
    }

    if !RoleRecord::delete(pool, role_id).await? {
        return Err(ServiceError::NotFound("Role"));
    }

    tracing::info!(role_id, role_name = %role.role_name, "Role deleted");

    Ok(())
}

// Departments

pub async fn list_departments(
    pool: &PgPool,
    identity: &Identity,
) -> ServiceResult<Vec<DepartmentRecord>> {
    authorize(identity, Operation::ManageDirectory)?;

    Ok(DepartmentRecord::list(pool).await?)
}

pub async fn create_department(
    pool: &PgPool,
    identity: &Identity,
    department_name: &str,
) -> ServiceResult<DepartmentRecord> {
    authorize(identity, Operation::ManageDirectory)?;

    let department =
        DepartmentRecord::create(pool, &required("Department name", department_name)?).await?;

    tracing::info!(
        department_id = department.department_id,
        department_name = %department.department_name,
        "Department created"
    );

    Ok(department)
}

pub async fn rename_department(
    pool: &PgPool,
    identity: &Identity,
    department_id: i64,
    department_name: &str,
) -> ServiceResult<DepartmentRecord> {
    authorize(identity, Operation::ManageDirectory)?;

    let department_name = required("Department name", department_name)?;

    let current = DepartmentRecord::find_by_id(pool, department_id)
        .await?
        .ok_or(ServiceError::NotFound("Department"))?;

    if current.is_protected() && current.department_name != department_name {
        return Err(ServiceError::Protected(
            "The QA department cannot be renamed".to_string(),
        ));
    }

    let department = DepartmentRecord::rename(pool, department_id, &department_name)
        .await?
        .ok_or(ServiceError::NotFound("Department"))?;

    tracing::info!(department_id, "Department renamed");

    Ok(department)
}

/// Deletes a department with no members; the QA department is never deleted
pub async fn delete_department(
    pool: &PgPool,
    identity: &Identity,
    department_id: i64,
) -> ServiceResult<()> {
    authorize(identity, Operation::ManageDirectory)?;

    let department = DepartmentRecord::find_by_id(pool, department_id)
        .await?
        .ok_or(ServiceError::NotFound("Department"))?;

    if department.is_protected() {
        return Err(ServiceError::Protected(
            "The QA department cannot be deleted".to_string(),
        ));
    }

    if !DepartmentRecord::delete(pool, department_id).await? {
        return Err(ServiceError::NotFound("Department"));
    }

    tracing::info!(
        department_id,
        department_name = %department.department_name,
        "Department deleted"
    );

    Ok(())
}
