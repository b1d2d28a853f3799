//! User profile endpoints
//!
//! The identity provider owns authentication; this table only keeps the
//! denormalized profile row other features read (display name, avatar,
//! last login).

use axum::{
    extract::{Extension, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use photosense_common::user::UserProfile;

use crate::error::{ApiError, ApiResult};
use crate::services::AuthUser;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    #[serde(default)]
    pub user_id: Option<String>,
}

/// POST /api/users
///
/// Upsert the caller's profile from identity-provider fields. Called on
/// login so `last_login` tracks real activity.
pub async fn upsert_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<StatusResponse>> {
    let profile = UserProfile::from_identity(
        &user.id,
        user.email.as_deref().unwrap_or_default(),
        user.user_metadata.name.as_deref(),
        user.avatar(),
        user.user_metadata.provider.as_deref(),
        user.created_at.as_deref(),
        user.updated_at.as_deref(),
    );
    state.metadata.put_user(&profile).await?;

    Ok(Json(StatusResponse {
        success: true,
        message: "User details stored successfully".to_string(),
    }))
}

/// GET /api/users?userId=...
///
/// Fetch a stored profile; defaults to the caller's own.
pub async fn get_user_details(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<UserProfile>> {
    let user_id = query.user_id.unwrap_or_else(|| user.id.clone());
    match state.metadata.get_user(&user_id).await? {
        Some(profile) => Ok(Json(profile)),
        None => Err(ApiError::NotFound(format!("no profile for {user_id}"))),
    }
}
