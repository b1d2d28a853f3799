//! Gallery filtering, search, and sorting
//!
//! A pure pass over an in-memory record list: category filter, then
//! case-insensitive substring search across filename, labels, location, and
//! detected text, then sort. Invoked per request; no state.

use serde::{Deserialize, Serialize};

use crate::collections::PEOPLE_LABELS;
use crate::model::ImageRecord;

/// Category filter tabs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GalleryFilter {
    #[default]
    All,
    /// Images with at least one detected face
    People,
    /// Images with at least one non-people label
    Objects,
    /// Images with a location
    Places,
    /// Images with detected text
    Text,
}

/// Sort orders for the gallery grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    Name,
}

impl GalleryFilter {
    fn matches(&self, record: &ImageRecord) -> bool {
        match self {
            GalleryFilter::All => true,
            GalleryFilter::People => record.faces > 0,
            GalleryFilter::Objects => record
                .labels
                .iter()
                .any(|l| !PEOPLE_LABELS.contains(&l.as_str())),
            GalleryFilter::Places => !record.location.is_empty(),
            GalleryFilter::Text => record.has_text(),
        }
    }
}

fn matches_search(record: &ImageRecord, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let needle = needle.to_lowercase();
    record.filename.to_lowercase().contains(&needle)
        || record
            .labels
            .iter()
            .any(|l| l.to_lowercase().contains(&needle))
        || (!record.location.is_empty() && record.location.to_lowercase().contains(&needle))
        || record
            .analysis
            .text
            .iter()
            .any(|t| t.to_lowercase().contains(&needle))
}

/// Apply filter, search, and sort to a record list.
///
/// Records whose `last_modified` fails to parse sort after all parseable
/// ones under the date orders.
pub fn filter_and_sort(
    records: &[ImageRecord],
    filter: GalleryFilter,
    search: &str,
    sort: SortOrder,
) -> Vec<ImageRecord> {
    let mut out: Vec<ImageRecord> = records
        .iter()
        .filter(|r| filter.matches(r) && matches_search(r, search))
        .cloned()
        .collect();

    match sort {
        SortOrder::Newest => {
            out.sort_by(|a, b| match (b.timestamp(), a.timestamp()) {
                (Some(tb), Some(ta)) => tb.cmp(&ta),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            });
        }
        SortOrder::Oldest => {
            out.sort_by(|a, b| match (a.timestamp(), b.timestamp()) {
                (Some(ta), Some(tb)) => ta.cmp(&tb),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            });
        }
        SortOrder::Name => out.sort_by(|a, b| a.filename.cmp(&b.filename)),
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnalysisDetails;

    fn record(filename: &str, labels: &[&str], location: &str, faces: u32) -> ImageRecord {
        ImageRecord {
            id: filename.to_string(),
            filename: filename.to_string(),
            labels: labels.iter().map(|s| s.to_string()).collect(),
            location: location.to_string(),
            faces,
            ..Default::default()
        }
    }

    #[test]
    fn people_filter_uses_face_count() {
        let records = vec![record("a.jpg", &[], "", 2), record("b.jpg", &[], "", 0)];
        let out = filter_and_sort(&records, GalleryFilter::People, "", SortOrder::Name);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].filename, "a.jpg");
    }

    #[test]
    fn objects_filter_ignores_people_labels() {
        let records = vec![
            record("a.jpg", &["Person", "Face"], "", 1),
            record("b.jpg", &["Dog"], "", 0),
        ];
        let out = filter_and_sort(&records, GalleryFilter::Objects, "", SortOrder::Name);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].filename, "b.jpg");
    }

    #[test]
    fn search_spans_labels_location_and_text() {
        let mut with_text = record("scan.jpg", &[], "", 0);
        with_text.analysis = AnalysisDetails {
            text: vec!["EXIT 42".to_string()],
            ..Default::default()
        };
        let records = vec![
            record("beach.jpg", &["Sand"], "Lisbon", 0),
            record("city.jpg", &["Tram"], "Lisbon", 0),
            with_text,
        ];
        let by_location = filter_and_sort(&records, GalleryFilter::All, "lisbon", SortOrder::Name);
        assert_eq!(by_location.len(), 2);
        let by_text = filter_and_sort(&records, GalleryFilter::All, "exit", SortOrder::Name);
        assert_eq!(by_text.len(), 1);
        assert_eq!(by_text[0].filename, "scan.jpg");
    }

    #[test]
    fn newest_sort_puts_unparseable_last() {
        let mut old = record("old.jpg", &[], "", 0);
        old.last_modified = "2023-01-05T00:00:00Z".to_string();
        let mut new = record("new.jpg", &[], "", 0);
        new.last_modified = "2025-06-01T00:00:00Z".to_string();
        let broken = record("broken.jpg", &[], "", 0);

        let out = filter_and_sort(
            &[old, broken, new],
            GalleryFilter::All,
            "",
            SortOrder::Newest,
        );
        let names: Vec<&str> = out.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, vec!["new.jpg", "old.jpg", "broken.jpg"]);
    }
}
