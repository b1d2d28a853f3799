//! Image listing
//!
//! The client fetches its full image-metadata list in one call and does all
//! grouping over that in-memory list. The list comes from the key-value
//! table; when the table has nothing for the user yet (pipeline lag, or a
//! library uploaded before analysis existed) the object-storage listing
//! serves as fallback. Access URLs are re-signed on every fetch so the
//! client never holds an expired link.

use std::time::Duration;

use axum::{
    extract::{Extension, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use photosense_common::gallery::{self, GalleryFilter, SortOrder};
use photosense_common::model::ImageRecord;
use photosense_common::user::storage_prefix;

use crate::error::ApiResult;
use crate::services::AuthUser;
use crate::AppState;

/// Optional server-side gallery controls
#[derive(Debug, Default, Deserialize)]
pub struct GalleryQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub filter: Option<GalleryFilter>,
    #[serde(default)]
    pub sort: Option<SortOrder>,
}

#[derive(Debug, Serialize)]
pub struct ImagesResponse {
    pub total: usize,
    pub images: Vec<ImageRecord>,
}

/// GET /api/images
pub async fn list_images(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<GalleryQuery>,
) -> ApiResult<Json<ImagesResponse>> {
    let records = fetch_user_images(&state, &user).await?;
    let images = gallery::filter_and_sort(
        &records,
        query.filter.unwrap_or_default(),
        query.search.as_deref().unwrap_or(""),
        query.sort.unwrap_or_default(),
    );
    Ok(Json(ImagesResponse {
        total: images.len(),
        images,
    }))
}

/// Materialize one user's full image list with fresh access URLs.
///
/// Shared by the gallery and collection endpoints so every view works over
/// the same record set.
pub(crate) async fn fetch_user_images(
    state: &AppState,
    user: &AuthUser,
) -> ApiResult<Vec<ImageRecord>> {
    let prefix = storage_prefix(user.identifier());

    let mut records = match state.metadata.list_images(&prefix).await {
        Ok(records) => records,
        Err(e) => {
            // Table trouble downgrades to the storage fallback below
            warn!("Metadata listing failed for {prefix}: {e}");
            Vec::new()
        }
    };

    if records.is_empty() {
        for object in state.storage.list_prefix(&prefix).await? {
            let filename = object
                .key
                .rsplit('/')
                .next()
                .unwrap_or_default()
                .to_string();
            records.push(ImageRecord {
                id: object.key.clone(),
                key: object.key,
                filename,
                size: object.size,
                last_modified: object.last_modified,
                ..Default::default()
            });
        }
    }

    let ttl = Duration::from_secs(state.config.limits.presign_ttl_secs);
    for record in &mut records {
        record.url = state.storage.presign_get(&record.key, ttl).await?;
    }

    Ok(records)
}
