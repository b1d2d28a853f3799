//! Session endpoints
//!
//! Both delegate wholly to the identity provider: the login-code exchange
//! after the provider's redirect, and token revocation on sign-out. These
//! sit outside the auth middleware: the exchange has no token yet, and
//! sign-out forwards the raw header so the exact token gets revoked.

use axum::{
    extract::State,
    http::HeaderMap,
    Json,
};
use serde::Deserialize;

use crate::api::auth::bearer_token;
use crate::api::users::StatusResponse;
use crate::error::{ApiError, ApiResult};
use crate::services::Session;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub code: String,
}

/// POST /api/auth/session
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<SessionRequest>,
) -> ApiResult<Json<Session>> {
    if request.code.trim().is_empty() {
        return Err(ApiError::BadRequest("code is required".to_string()));
    }
    let session = state.identity.exchange_code(request.code.trim()).await?;
    Ok(Json(session))
}

/// POST /api/auth/signout
pub async fn sign_out(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<StatusResponse>> {
    let token = bearer_token(&headers).ok_or_else(|| {
        ApiError::Unauthorized("missing or invalid Authorization header".to_string())
    })?;
    state.identity.sign_out(token).await?;

    Ok(Json(StatusResponse {
        success: true,
        message: "Signed out".to_string(),
    }))
}
