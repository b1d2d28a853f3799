//! Tests for smart-collection aggregation and selection
//!
//! Covers the aggregation contract end to end: people membership, the
//! minimum-size-3 location and date thresholds, top-5 label ranking with
//! stable ties, bucket ordering, selection idempotence, and the degenerate
//! empty-library case.

use photosense_common::collections::{aggregate, select};
use photosense_common::model::{CollectionKind, ImageRecord};

fn record(id: &str) -> ImageRecord {
    ImageRecord {
        id: id.to_string(),
        key: format!("users/test/{id}.jpg"),
        filename: format!("{id}.jpg"),
        url: format!("https://storage.example/{id}.jpg"),
        last_modified: "2025-03-10T12:00:00Z".to_string(),
        ..Default::default()
    }
}

fn with_faces(id: &str, faces: u32) -> ImageRecord {
    ImageRecord { faces, ..record(id) }
}

fn with_location(id: &str, location: &str) -> ImageRecord {
    ImageRecord { location: location.to_string(), ..record(id) }
}

fn with_labels(id: &str, labels: &[&str]) -> ImageRecord {
    ImageRecord {
        labels: labels.iter().map(|s| s.to_string()).collect(),
        ..record(id)
    }
}

fn with_date(id: &str, last_modified: &str) -> ImageRecord {
    ImageRecord { last_modified: last_modified.to_string(), ..record(id) }
}

// =============================================================================
// People bucket
// =============================================================================

#[test]
fn people_membership_is_exactly_face_count_positive() {
    let records = vec![
        with_faces("a", 2),
        with_faces("b", 0),
        with_faces("c", 1),
        with_faces("d", 0),
    ];
    let summaries = aggregate(&records);

    let people = &summaries[0];
    assert_eq!(people.id, "people");
    assert_eq!(people.kind, CollectionKind::People);
    assert_eq!(people.count, 2);
    // Cover is the first matching record in input order
    assert_eq!(people.cover_url.as_deref(), Some("https://storage.example/a.jpg"));

    let selected = select(&records, "people").unwrap();
    let ids: Vec<&str> = selected.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c"]);
}

#[test]
fn people_bucket_emitted_even_with_zero_members() {
    let records = vec![with_faces("a", 0), with_faces("b", 0)];
    let summaries = aggregate(&records);

    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].id, "people");
    assert_eq!(summaries[0].count, 0);
    assert!(summaries[0].cover_url.is_none());
}

// =============================================================================
// Location buckets
// =============================================================================

#[test]
fn location_groups_below_three_are_dropped() {
    let records = vec![
        with_location("a", "Paris"),
        with_location("b", "Paris"),
        with_location("c", "Paris"),
        with_location("d", "Oslo"),
        with_location("e", "Oslo"),
        with_location("f", ""),
    ];
    let summaries = aggregate(&records);

    let locations: Vec<&str> = summaries
        .iter()
        .filter(|s| s.kind == CollectionKind::Location)
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(locations, vec!["Paris"]);

    let paris = summaries.iter().find(|s| s.id == "location-paris").unwrap();
    assert_eq!(paris.count, 3);
}

#[test]
fn location_grouping_is_case_sensitive() {
    let records = vec![
        with_location("a", "paris"),
        with_location("b", "Paris"),
        with_location("c", "Paris"),
        with_location("d", "Paris"),
    ];
    let summaries = aggregate(&records);

    // "paris" and "Paris" are distinct groups; only the latter clears the bar
    let paris = summaries.iter().find(|s| s.id == "location-paris").unwrap();
    assert_eq!(paris.count, 3);
    assert_eq!(paris.name, "Paris");
}

#[test]
fn location_buckets_keep_first_appearance_order() {
    let mut records = Vec::new();
    for i in 0..3 {
        records.push(with_location(&format!("t{i}"), "Tokyo"));
        records.push(with_location(&format!("l{i}"), "Lima"));
    }
    let summaries = aggregate(&records);

    let names: Vec<&str> = summaries
        .iter()
        .filter(|s| s.kind == CollectionKind::Location)
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(names, vec!["Tokyo", "Lima"]);
}

// =============================================================================
// Label buckets
// =============================================================================

#[test]
fn labels_ranked_top_five_with_stable_ties() {
    let records = vec![
        with_labels("a", &["Dog", "Cat"]),
        with_labels("b", &["Dog", "Tree"]),
        with_labels("c", &["Dog", "Car", "Boat", "Sky"]),
        with_labels("d", &["Cat", "Tree"]),
        with_labels("e", &["Cat"]),
    ];
    let summaries = aggregate(&records);

    let labels: Vec<&str> = summaries
        .iter()
        .filter(|s| s.kind == CollectionKind::Label)
        .map(|s| s.name.as_str())
        .collect();
    // Dog 3, Cat 3, Tree 2, then the count-1 labels in encounter order,
    // capped at five. Dog beats Cat on first encounter; Car beats Boat/Sky.
    assert_eq!(labels, vec!["Dog", "Cat", "Tree", "Car", "Boat"]);

    let dog = summaries.iter().find(|s| s.id == "label-dog").unwrap();
    assert_eq!(dog.count, 3);
}

#[test]
fn label_ranking_is_deterministic_across_runs() {
    let records = vec![
        with_labels("a", &["Sunset", "Beach"]),
        with_labels("b", &["Beach", "Sunset"]),
        with_labels("c", &["Mountain"]),
    ];
    let first = aggregate(&records);
    let second = aggregate(&records);

    let ids_of = |summaries: &[photosense_common::CollectionSummary]| -> Vec<String> {
        summaries
            .iter()
            .filter(|s| s.kind == CollectionKind::Label)
            .map(|s| s.id.clone())
            .collect()
    };
    assert_eq!(ids_of(&first), ids_of(&second));
}

// =============================================================================
// Date buckets
// =============================================================================

#[test]
fn date_buckets_group_by_month_year_with_threshold() {
    let records = vec![
        with_date("a", "2025-03-01T10:00:00Z"),
        with_date("b", "2025-03-15T10:00:00Z"),
        with_date("c", "2025-03-28T10:00:00Z"),
        with_date("d", "2025-02-02T10:00:00Z"),
        with_date("e", "2025-02-20T10:00:00Z"),
    ];
    let summaries = aggregate(&records);

    let dates: Vec<&str> = summaries
        .iter()
        .filter(|s| s.kind == CollectionKind::Date)
        .map(|s| s.name.as_str())
        .collect();
    // February has only two members and is dropped
    assert_eq!(dates, vec!["March 2025"]);
}

#[test]
fn unparseable_dates_excluded_from_date_buckets_only() {
    let mut broken = with_faces("x", 1);
    broken.last_modified = "last tuesday".to_string();
    let records = vec![
        broken,
        with_date("a", "2025-05-01T00:00:00Z"),
        with_date("b", "2025-05-02T00:00:00Z"),
        with_date("c", "2025-05-03T00:00:00Z"),
    ];
    let summaries = aggregate(&records);

    let may = summaries.iter().find(|s| s.id == "date-may-2025").unwrap();
    assert_eq!(may.count, 3);
    // The broken record still participates in other bucket kinds
    assert_eq!(summaries[0].count, 1);

    let selected = select(&records, "date-may-2025").unwrap();
    assert!(selected.iter().all(|r| r.id != "x"));
}

#[test]
fn date_buckets_ordered_by_first_member_newest_first() {
    let mut records = Vec::new();
    for day in 1..=3 {
        records.push(with_date(&format!("jan{day}"), &format!("2025-01-0{day}T00:00:00Z")));
    }
    for day in 1..=3 {
        records.push(with_date(&format!("jun{day}"), &format!("2025-06-0{day}T00:00:00Z")));
    }
    let summaries = aggregate(&records);

    let dates: Vec<&str> = summaries
        .iter()
        .filter(|s| s.kind == CollectionKind::Date)
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(dates, vec!["June 2025", "January 2025"]);
}

// =============================================================================
// Selection contract
// =============================================================================

#[test]
fn selection_is_idempotent() {
    let records = vec![
        with_location("a", "Kyoto"),
        with_location("b", "Kyoto"),
        with_location("c", "Kyoto"),
        with_faces("d", 1),
    ];
    let first = select(&records, "location-kyoto").unwrap();
    let second = select(&records, "location-kyoto").unwrap();

    let ids = |v: &[ImageRecord]| v.iter().map(|r| r.id.clone()).collect::<Vec<_>>();
    assert_eq!(ids(&first), ids(&second));
    assert_eq!(first.len(), 3);
}

#[test]
fn selection_counts_match_emitted_summaries() {
    let mut records = vec![
        with_faces("f1", 2),
        with_labels("l1", &["Cat"]),
        with_labels("l2", &["Cat"]),
    ];
    for i in 0..3 {
        records.push(with_location(&format!("p{i}"), "New York"));
    }
    for summary in aggregate(&records) {
        let selected = select(&records, &summary.id).unwrap();
        assert_eq!(selected.len(), summary.count, "mismatch for {}", summary.id);
    }
}

#[test]
fn unknown_collection_kind_is_rejected() {
    let records = vec![record("a")];
    assert!(select(&records, "album-holiday").is_none());
    assert!(select(&records, "").is_none());
}

// =============================================================================
// Concrete scenario and empty input
// =============================================================================

#[test]
fn mixed_library_scenario() {
    let records = vec![
        with_faces("a", 2),
        with_location("b", "Paris"),
        with_location("c", "Paris"),
        with_location("d", "Paris"),
        with_labels("e", &["Cat"]),
        with_labels("f", &["Cat"]),
    ];
    let summaries = aggregate(&records);

    let people = summaries.iter().find(|s| s.id == "people").unwrap();
    assert_eq!(people.count, 1);

    let paris = summaries.iter().find(|s| s.id == "location-paris").unwrap();
    assert_eq!(paris.count, 3);

    let cat = summaries.iter().find(|s| s.id == "label-cat").unwrap();
    assert_eq!(cat.count, 2);

    // All six records share March 2025, so a single date bucket clears the bar
    let dates: Vec<_> = summaries.iter().filter(|s| s.kind == CollectionKind::Date).collect();
    assert_eq!(dates.len(), 1);
    assert_eq!(dates[0].count, 6);
}

#[test]
fn empty_library_yields_only_empty_people_bucket() {
    let summaries = aggregate(&[]);
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].id, "people");
    assert_eq!(summaries[0].count, 0);
    assert!(summaries[0].cover_url.is_none());
}

#[test]
fn emission_order_is_people_locations_labels_dates() {
    let mut records = vec![with_faces("f", 1)];
    for i in 0..3 {
        records.push(with_location(&format!("p{i}"), "Rome"));
    }
    records.push(with_labels("l", &["Dog"]));
    let summaries = aggregate(&records);

    let kinds: Vec<CollectionKind> = summaries.iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![
            CollectionKind::People,
            CollectionKind::Location,
            CollectionKind::Label,
            CollectionKind::Date,
        ]
    );
}
