//! Metrics endpoints
//!
//! - `GET /v1/metrics/global` - Staff efficiency and on-time rate (Admin)
//! - `GET /v1/metrics/:user_id` - Task counts for one user (that user or Admin)

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use teamtrack_shared::{
    auth::identity::Identity,
    models::metrics::{GlobalMetrics, UserMetrics},
    service::metrics,
};

pub async fn global_metrics(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<GlobalMetrics>> {
    Ok(Json(metrics::get_global_metrics(&state.db, &identity).await?))
}

pub async fn user_metrics(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<UserMetrics>> {
    Ok(Json(
        metrics::get_user_metrics(&state.db, &identity, user_id).await?,
    ))
}
