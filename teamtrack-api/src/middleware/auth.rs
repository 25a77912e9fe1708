//! Bearer token authentication
//!
//! Validates `Authorization: Bearer <token>`, builds the caller's
//! [`Identity`] from the claims and stores it in the request extensions.
//! Handlers read it with `Extension<Identity>`.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use teamtrack_shared::auth::{identity::Identity, jwt};

use crate::{app::AppState, error::ApiError};

/// Extracts the token from an Authorization header value
fn bearer_token(header_value: &str) -> Result<&str, ApiError> {
    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::BadRequest("Expected Bearer token".to_string()))?
        .trim();

    if token.is_empty() {
        return Err(ApiError::Unauthorized("Missing token".to_string()));
    }

    Ok(token)
}

/// Rejects requests without a valid session token
pub async fn require_identity(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    let claims = jwt::validate_token(bearer_token(auth_header)?, state.jwt_secret())?;
    let identity = Identity::from_claims(&claims);

    tracing::debug!(
        user_id = identity.user_id,
        role = %identity.role,
        "Request authenticated"
    );

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}
