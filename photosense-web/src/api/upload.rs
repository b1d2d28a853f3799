//! Direct-to-storage upload URLs
//!
//! The service never receives file bytes. The client asks for a pre-signed
//! URL, uploads straight to object storage, and the vision pipeline picks
//! the object up from there.

use std::time::Duration;

use axum::{
    extract::{Extension, State},
    Json,
};
use serde::{Deserialize, Serialize};

use photosense_common::user::storage_prefix;

use crate::error::{ApiError, ApiResult};
use crate::services::AuthUser;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub filename: String,
    pub content_type: String,
    #[serde(default)]
    pub file_size: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Pre-signed PUT URL the client uploads to
    pub url: String,
    /// Object key the upload will land at
    pub key: String,
    pub expires_in: u64,
}

/// POST /api/upload
pub async fn create_upload_url(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<UploadRequest>,
) -> ApiResult<Json<UploadResponse>> {
    let filename = request.filename.trim();
    if filename.is_empty() || request.content_type.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "filename and contentType are required".to_string(),
        ));
    }
    // Keys must stay inside the caller's prefix
    if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
        return Err(ApiError::BadRequest(
            "filename must not contain path separators".to_string(),
        ));
    }

    let key = format!("{}{}", storage_prefix(user.identifier()), filename);
    let ttl = Duration::from_secs(state.config.limits.presign_ttl_secs);
    let url = state
        .storage
        .presign_put(&key, request.content_type.trim(), ttl)
        .await?;

    Ok(Json(UploadResponse {
        url,
        key,
        expires_in: state.config.limits.presign_ttl_secs,
    }))
}
