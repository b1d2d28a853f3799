//! Authentication middleware
//!
//! Every protected route requires `Authorization: Bearer <token>`; the
//! token is verified against the identity provider and the resulting user
//! is attached to the request for handlers to consume. `/health` and the
//! pub/sub webhook stay outside this middleware.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::AppState;

/// Extract the bearer token from request headers
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Verify the caller's token and inject [`crate::services::AuthUser`]
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers()).ok_or_else(|| {
        ApiError::Unauthorized("missing or invalid Authorization header".to_string())
    })?;

    let user = state.identity.get_user(token).await?;
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
