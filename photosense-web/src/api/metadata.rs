//! Metadata aggregate
//!
//! One table-wide rollup used by the search and moderation views: distinct
//! labels, distinct locations, and counts of face/text-bearing images. The
//! scan is the expensive part, so the result is cached in-process and
//! refreshed at most every 15 minutes.

use std::time::Instant;

use axum::{extract::State, Json};
use serde::Serialize;

use photosense_common::model::ImageRecord;

use crate::error::ApiResult;
use crate::AppState;

/// Aggregated metadata across the whole image table
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataSummary {
    pub labels: Vec<String>,
    pub locations: Vec<String>,
    pub face_count: usize,
    pub text_count: usize,
    pub total_images: usize,
}

/// GET /api/metadata/aggregate
pub async fn aggregate_metadata(State(state): State<AppState>) -> ApiResult<Json<MetadataSummary>> {
    let ttl = std::time::Duration::from_secs(state.config.limits.aggregate_cache_secs);

    if let Some((stamp, summary)) = state.aggregate_cache.read().await.as_ref() {
        if stamp.elapsed() < ttl {
            return Ok(Json(summary.clone()));
        }
    }

    let records = state.metadata.scan_all().await?;
    let summary = summarize(&records);
    *state.aggregate_cache.write().await = Some((Instant::now(), summary.clone()));

    Ok(Json(summary))
}

/// Roll a record list up into the aggregate view. Distinct values keep
/// first-encounter order.
fn summarize(records: &[ImageRecord]) -> MetadataSummary {
    let mut labels: Vec<String> = Vec::new();
    let mut locations: Vec<String> = Vec::new();
    let mut face_count = 0;
    let mut text_count = 0;

    for record in records {
        for label in &record.labels {
            if !labels.contains(label) {
                labels.push(label.clone());
            }
        }
        if !record.location.trim().is_empty() && !locations.contains(&record.location) {
            locations.push(record.location.clone());
        }
        if record.faces > 0 {
            face_count += 1;
        }
        if record.has_text() {
            text_count += 1;
        }
    }

    MetadataSummary {
        labels,
        locations,
        face_count,
        text_count,
        total_images: records.len(),
    }
}
