//! Smart-collection endpoints
//!
//! Aggregation runs fresh over the caller's current image list on every
//! request; nothing is stored. Selecting a collection re-derives the
//! predicate from the identifier and filters the same list.

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde::Serialize;

use photosense_common::collections;
use photosense_common::model::{CollectionKind, CollectionSummary, ImageRecord};

use crate::api::images::fetch_user_images;
use crate::error::{ApiError, ApiResult};
use crate::services::AuthUser;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CollectionsResponse {
    pub collections: Vec<CollectionSummary>,
}

#[derive(Debug, Serialize)]
pub struct CollectionResponse {
    pub id: String,
    pub name: String,
    pub kind: CollectionKind,
    pub count: usize,
    pub images: Vec<ImageRecord>,
}

/// GET /api/collections
pub async fn list_collections(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<CollectionsResponse>> {
    let records = fetch_user_images(&state, &user).await?;
    Ok(Json(CollectionsResponse {
        collections: collections::aggregate(&records),
    }))
}

/// GET /api/collections/:id
pub async fn get_collection(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<CollectionResponse>> {
    let kind = collections::kind_of(&id)
        .ok_or_else(|| ApiError::NotFound(format!("unknown collection: {id}")))?;

    let records = fetch_user_images(&state, &user).await?;
    let images = collections::select(&records, &id).unwrap_or_default();
    let name = display_name(&id, kind, &images);

    Ok(Json(CollectionResponse {
        id,
        name,
        kind,
        count: images.len(),
        images,
    }))
}

/// Recover a display name from the identifier, preferring the original
/// casing kept on matching records.
fn display_name(id: &str, kind: CollectionKind, images: &[ImageRecord]) -> String {
    match kind {
        CollectionKind::People => "People".to_string(),
        CollectionKind::Location => images
            .first()
            .map(|r| r.location.clone())
            .unwrap_or_else(|| title_case(&deslug(id, "location-"))),
        CollectionKind::Label => title_case(&deslug(id, "label-")),
        CollectionKind::Date => title_case(&deslug(id, "date-")),
    }
}

fn deslug(id: &str, prefix: &str) -> String {
    id.strip_prefix(prefix).unwrap_or(id).replace('-', " ")
}

fn title_case(name: &str) -> String {
    name.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_capitalizes_each_word() {
        assert_eq!(title_case("march 2025"), "March 2025");
        assert_eq!(title_case("new york"), "New York");
        assert_eq!(title_case("cat"), "Cat");
    }

    #[test]
    fn display_name_prefers_record_casing_for_locations() {
        let record = ImageRecord {
            location: "New York".to_string(),
            ..Default::default()
        };
        let name = display_name(
            "location-new-york",
            CollectionKind::Location,
            std::slice::from_ref(&record),
        );
        assert_eq!(name, "New York");

        let empty = display_name("location-new-york", CollectionKind::Location, &[]);
        assert_eq!(empty, "New York");
    }
}
