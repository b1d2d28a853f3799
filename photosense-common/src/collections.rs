//! Smart-collection aggregation
//!
//! A single synchronous pass over an in-memory image list, partitioning it
//! into four independent groupings (people, location, label, date) and
//! emitting display-ready summaries. Summaries are recomputed on every call
//! and never persisted.
//!
//! The companion [`select`] function re-derives a collection's predicate
//! from its identifier and filters the same list, so a summary's implied
//! membership and the selected records always agree.

use crate::model::{CollectionKind, CollectionSummary, ImageRecord};

/// Minimum group size for location and date collections. Smaller groups are
/// dropped silently, not merged into an "other" bucket.
const MIN_GROUP_SIZE: usize = 3;

/// Number of label collections emitted, ranked by occurrence count.
const TOP_LABELS: usize = 5;

/// Labels treated as people markers by the gallery's "Objects" filter.
pub const PEOPLE_LABELS: [&str; 4] = ["People", "Person", "Human", "Face"];

/// Build the smart-collection summaries for one user's image list.
///
/// Emission order: the people summary first, then location groups in input
/// order of first appearance, then the top label groups in ranked order,
/// then date groups most-recently-active first.
pub fn aggregate(records: &[ImageRecord]) -> Vec<CollectionSummary> {
    let mut summaries = Vec::new();

    // People: a standing category, emitted even with zero members.
    let mut people_count = 0usize;
    let mut people_cover = None;
    for record in records {
        if record.faces > 0 {
            if people_cover.is_none() {
                people_cover = Some(record.url.clone());
            }
            people_count += 1;
        }
    }
    summaries.push(CollectionSummary {
        id: "people".to_string(),
        name: "People".to_string(),
        kind: CollectionKind::People,
        count: people_count,
        cover_url: people_cover,
    });

    // Locations: exact, case-sensitive grouping; empty string is "no location".
    let mut locations: Vec<(String, usize, String)> = Vec::new();
    for record in records {
        if record.location.trim().is_empty() {
            continue;
        }
        match locations.iter_mut().find(|(name, _, _)| *name == record.location) {
            Some((_, count, _)) => *count += 1,
            None => locations.push((record.location.clone(), 1, record.url.clone())),
        }
    }
    for (name, count, cover) in locations {
        if count < MIN_GROUP_SIZE {
            continue;
        }
        summaries.push(CollectionSummary {
            id: format!("location-{}", slug(&name)),
            name,
            kind: CollectionKind::Location,
            count,
            cover_url: Some(cover),
        });
    }

    // Labels: tally every occurrence (each record contributes each of its
    // labels once), rank descending with ties kept in first-encountered
    // order, then recompute membership per winning label.
    let mut tally: Vec<(String, usize)> = Vec::new();
    for record in records {
        for label in &record.labels {
            match tally.iter_mut().find(|(name, _)| name == label) {
                Some((_, count)) => *count += 1,
                None => tally.push((label.clone(), 1)),
            }
        }
    }
    let mut ranked = tally;
    ranked.sort_by(|a, b| b.1.cmp(&a.1)); // stable: ties stay in encounter order
    for (label, _) in ranked.into_iter().take(TOP_LABELS) {
        let members: Vec<&ImageRecord> = records
            .iter()
            .filter(|r| r.labels.iter().any(|l| *l == label))
            .collect();
        summaries.push(CollectionSummary {
            id: format!("label-{}", slug(&label)),
            name: label,
            kind: CollectionKind::Label,
            count: members.len(),
            cover_url: members.first().map(|r| r.url.clone()),
        });
    }

    // Dates: bucket by "Month Year"; records with unparseable timestamps are
    // excluded from date grouping only. Buckets are ordered by the
    // timestamp of each bucket's first member, newest first.
    let mut dates: Vec<(String, usize, String, chrono::DateTime<chrono::Utc>)> = Vec::new();
    for record in records {
        let Some(timestamp) = record.timestamp() else {
            continue;
        };
        let month_year = timestamp.format("%B %Y").to_string();
        match dates.iter_mut().find(|(name, _, _, _)| *name == month_year) {
            Some((_, count, _, _)) => *count += 1,
            None => dates.push((month_year, 1, record.url.clone(), timestamp)),
        }
    }
    dates.retain(|(_, count, _, _)| *count >= MIN_GROUP_SIZE);
    dates.sort_by(|a, b| b.3.cmp(&a.3));
    for (name, count, cover, _) in dates {
        summaries.push(CollectionSummary {
            id: format!("date-{}", slug(&name)),
            name,
            kind: CollectionKind::Date,
            count,
            cover_url: Some(cover),
        });
    }

    summaries
}

/// Filter the record list by a collection identifier.
///
/// The predicate is re-derived from the identifier's kind prefix and
/// discriminator, matching what [`aggregate`] emitted. Pure and idempotent:
/// the same identifier over the same list always yields the same records.
/// Returns `None` for an identifier with no recognized kind prefix.
pub fn select(records: &[ImageRecord], id: &str) -> Option<Vec<ImageRecord>> {
    if id == "people" {
        return Some(records.iter().filter(|r| r.faces > 0).cloned().collect());
    }
    if let Some(rest) = id.strip_prefix("location-") {
        let name = unslug(rest);
        return Some(
            records
                .iter()
                .filter(|r| r.location.to_lowercase() == name)
                .cloned()
                .collect(),
        );
    }
    if let Some(rest) = id.strip_prefix("label-") {
        let name = unslug(rest);
        return Some(
            records
                .iter()
                .filter(|r| r.labels.iter().any(|l| l.to_lowercase() == name))
                .cloned()
                .collect(),
        );
    }
    if let Some(rest) = id.strip_prefix("date-") {
        let name = unslug(rest);
        return Some(
            records
                .iter()
                .filter(|r| {
                    r.month_year()
                        .map(|m| m.to_lowercase() == name)
                        .unwrap_or(false)
                })
                .cloned()
                .collect(),
        );
    }
    None
}

/// The collection kind encoded in an identifier, if recognized
pub fn kind_of(id: &str) -> Option<CollectionKind> {
    if id == "people" {
        Some(CollectionKind::People)
    } else if id.starts_with("location-") {
        Some(CollectionKind::Location)
    } else if id.starts_with("label-") {
        Some(CollectionKind::Label)
    } else if id.starts_with("date-") {
        Some(CollectionKind::Date)
    } else {
        None
    }
}

/// Lowercase a display name and collapse whitespace runs to dashes,
/// producing the discriminator part of a collection identifier.
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_gap = false;
    for c in name.to_lowercase().chars() {
        if c.is_whitespace() {
            in_gap = true;
        } else {
            if in_gap && !out.is_empty() {
                out.push('-');
            }
            in_gap = false;
            out.push(c);
        }
    }
    out
}

fn unslug(slug: &str) -> String {
    slug.replace('-', " ")
}
