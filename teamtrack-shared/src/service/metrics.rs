//! Metrics operations

use sqlx::PgPool;

use super::{ServiceError, ServiceResult};
use crate::auth::authorization::{authorize, Operation};
use crate::auth::identity::Identity;
use crate::models::metrics::{GlobalMetrics, UserMetrics};
use crate::models::user::User;

/// Task counts for `user_id`, visible to that user and to Admins
pub async fn get_user_metrics(
    pool: &PgPool,
    identity: &Identity,
    user_id: i64,
) -> ServiceResult<UserMetrics> {
    authorize(identity, Operation::ViewUserMetrics { user_id })?;

    if User::find_by_id(pool, user_id).await?.is_none() {
        return Err(ServiceError::NotFound("User"));
    }

    Ok(UserMetrics::for_user(pool, user_id).await?)
}

pub async fn get_global_metrics(pool: &PgPool, identity: &Identity) -> ServiceResult<GlobalMetrics> {
    authorize(identity, Operation::ViewGlobalMetrics)?;

    Ok(GlobalMetrics::compute(pool).await?)
}
