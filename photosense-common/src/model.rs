//! Image metadata and collection types
//!
//! `ImageRecord` is produced by the external vision-analysis pipeline and
//! consumed read-only here: the service reads and re-groups `labels`,
//! `faces`, and `location` but never mutates them.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// One unit of per-photo metadata combining storage location and
/// AI-derived analysis results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    /// Opaque unique identifier
    pub id: String,
    /// Object-storage key (`users/{user_key}/{filename}`)
    pub key: String,
    /// Original filename
    pub filename: String,
    /// Time-limited pre-signed access URL; may expire and be refreshed
    pub url: String,
    /// Object size in bytes
    #[serde(default)]
    pub size: u64,
    /// Upload timestamp as stored; parsed on demand via [`ImageRecord::timestamp`]
    #[serde(default)]
    pub last_modified: String,
    /// Detected label tags (order irrelevant for grouping)
    #[serde(default)]
    pub labels: Vec<String>,
    /// Number of detected faces
    #[serde(default)]
    pub faces: u32,
    /// Location string; empty means "no location"
    #[serde(default)]
    pub location: String,
    /// Full per-detection analysis results
    #[serde(default)]
    pub analysis: AnalysisDetails,
}

/// Structured analysis output from the vision pipeline.
///
/// Every field carries an explicit default so records written before a
/// pipeline feature existed still deserialize cleanly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisDetails {
    #[serde(default)]
    pub labels: Vec<LabelDetection>,
    #[serde(default)]
    pub faces: u32,
    #[serde(default)]
    pub celebrities: Vec<CelebrityDetection>,
    #[serde(default)]
    pub text: Vec<String>,
    #[serde(default)]
    pub analyzed_at: String,
}

/// A detected label with its confidence score
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelDetection {
    pub name: String,
    #[serde(default)]
    pub confidence: f64,
}

/// A detected celebrity with its confidence score
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CelebrityDetection {
    pub name: String,
    #[serde(default)]
    pub confidence: f64,
}

impl ImageRecord {
    /// Parse `last_modified` into a UTC timestamp.
    ///
    /// Accepts RFC 3339, RFC 2822, and the common bare date-time forms the
    /// pipeline has historically written. Returns `None` when the value is
    /// unparseable; callers degrade per their own contract (date bucketing
    /// excludes the record, sorting pushes it last).
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.last_modified)
    }

    /// Derive the "Month Year" bucket string (e.g. "March 2025") from
    /// `last_modified`, or `None` when the timestamp is unparseable.
    pub fn month_year(&self) -> Option<String> {
        self.timestamp().map(|t| t.format("%B %Y").to_string())
    }

    /// Whether the analysis pipeline detected any text in the image
    pub fn has_text(&self) -> bool {
        !self.analysis.text.is_empty()
    }
}

/// Parse a stored timestamp string into UTC, trying the formats the
/// pipeline and object store emit.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(t) = DateTime::parse_from_rfc3339(value) {
        return Some(t.with_timezone(&Utc));
    }
    if let Ok(t) = DateTime::parse_from_rfc2822(value) {
        return Some(t.with_timezone(&Utc));
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(t.and_utc());
    }
    if let Ok(d) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(d.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}

/// The four smart-collection groupings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    People,
    Location,
    Label,
    Date,
}

/// A derived, recomputed-on-demand grouping descriptor.
///
/// Summaries are rebuilt from the current record list on every aggregation
/// run and carry no independent identity or storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionSummary {
    /// Deterministic identifier: `people`, `location-{slug}`,
    /// `label-{slug}`, or `date-{slug}`
    pub id: String,
    /// Display name
    pub name: String,
    pub kind: CollectionKind,
    /// Count of records satisfying the collection's predicate
    pub count: usize,
    /// Access URL of the first matching record, for the thumbnail
    pub cover_url: Option<String>,
}
