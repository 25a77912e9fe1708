//! Account operations: login, profile and password change
//!
//! Token issuance stays with the API layer, which owns the signing secret.
//! Login here only proves the credentials and returns the profile the token is
//! built from.

use sqlx::PgPool;

use super::{ServiceError, ServiceResult};
use crate::auth::authorization::{authorize, Operation};
use crate::auth::identity::Identity;
use crate::auth::password::{
    hash_password_async, validate_new_password, verify_password_async,
};
use crate::models::user::{User, UserProfile};

/// Checks a username and password
///
/// Unknown users and wrong passwords produce the same error.
pub async fn login(pool: &PgPool, username: &str, password: &str) -> ServiceResult<UserProfile> {
    let Some(credentials) = User::find_credentials(pool, username).await? else {
        tracing::warn!(username = %username, "Login for unknown user");
        return Err(ServiceError::InvalidCredentials);
    };

    let valid =
        verify_password_async(password.to_string(), credentials.password_hash.clone()).await?;

    if !valid {
        tracing::warn!(user_id = credentials.profile.user_id, "Login with wrong password");
        return Err(ServiceError::InvalidCredentials);
    }

    tracing::info!(
        user_id = credentials.profile.user_id,
        role = %credentials.profile.role,
        "User logged in"
    );

    Ok(credentials.profile)
}

/// Profile of the caller
pub async fn current_profile(pool: &PgPool, identity: &Identity) -> ServiceResult<UserProfile> {
    User::find_profile(pool, identity.user_id)
        .await?
        .ok_or(ServiceError::NotFound("User"))
}

/// Replaces the caller's password after checking the current one
pub async fn change_password(
    pool: &PgPool,
    identity: &Identity,
    current_password: &str,
    new_password: &str,
) -> ServiceResult<()> {
    authorize(
        identity,
        Operation::ChangePassword {
            user_id: identity.user_id,
        },
    )?;

    validate_new_password(new_password).map_err(ServiceError::InvalidInput)?;

    let user = User::find_by_id(pool, identity.user_id)
        .await?
        .ok_or(ServiceError::NotFound("User"))?;

    if !verify_password_async(current_password.to_string(), user.password_hash).await? {
        return Err(ServiceError::InvalidInput(
            "Current password is incorrect".to_string(),
        ));
    }

    let password_hash = hash_password_async(new_password.to_string()).await?;

    if !User::update_password(pool, identity.user_id, &password_hash).await? {
        return Err(ServiceError::NotFound("User"));
    }

    tracing::info!(user_id = identity.user_id, "Password changed");

    Ok(())
}
