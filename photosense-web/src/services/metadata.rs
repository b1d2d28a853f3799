//! Key-value metadata table adapter
//!
//! The vision pipeline writes one item per analyzed image, keyed by the
//! object-storage key; this service only scans and reads them. The same
//! table family also holds user profile rows written at login.
//!
//! Item attributes arrive loosely shaped (the pipeline has grown fields
//! over time), so every read goes through an explicit mapping with typed
//! defaults instead of failing on absent attributes.

use std::collections::HashMap;

use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;

use photosense_common::model::{AnalysisDetails, CelebrityDetection, ImageRecord, LabelDetection};
use photosense_common::user::UserProfile;
use photosense_common::{Error, Result};

type Item = HashMap<String, AttributeValue>;

/// Typed access to the image-metadata and user-details tables
#[derive(Clone)]
pub struct MetadataStore {
    client: aws_sdk_dynamodb::Client,
    image_table: String,
    user_table: String,
}

impl MetadataStore {
    pub fn new(client: aws_sdk_dynamodb::Client, image_table: String, user_table: String) -> Self {
        Self {
            client,
            image_table,
            user_table,
        }
    }

    /// All image records whose storage key starts with `prefix`
    /// (one user's library).
    pub async fn list_images(&self, prefix: &str) -> Result<Vec<ImageRecord>> {
        self.scan_images(Some(prefix)).await
    }

    /// Every image record in the table, across all users. Used only by the
    /// cached metadata aggregate.
    pub async fn scan_all(&self) -> Result<Vec<ImageRecord>> {
        self.scan_images(None).await
    }

    async fn scan_images(&self, prefix: Option<&str>) -> Result<Vec<ImageRecord>> {
        let mut records = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let mut request = self.client.scan().table_name(&self.image_table);
            if let Some(prefix) = prefix {
                request = request
                    .filter_expression("begins_with(ImageId, :prefix)")
                    .expression_attribute_values(":prefix", AttributeValue::S(prefix.to_string()));
            }
            request = request.set_exclusive_start_key(start_key.take());

            let response = request
                .send()
                .await
                .map_err(|e| Error::MetadataStore(format!("{}", DisplayErrorContext(&e))))?;

            records.extend(response.items().iter().map(image_from_item));

            match response.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }

        Ok(records)
    }

    /// Upsert a user profile row
    pub async fn put_user(&self, profile: &UserProfile) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.user_table)
            .set_item(Some(user_to_item(profile)))
            .send()
            .await
            .map_err(|e| Error::MetadataStore(format!("{}", DisplayErrorContext(&e))))?;
        Ok(())
    }

    /// Fetch a user profile row by id
    pub async fn get_user(&self, user_id: &str) -> Result<Option<UserProfile>> {
        let response = self
            .client
            .get_item()
            .table_name(&self.user_table)
            .key("UserId", AttributeValue::S(user_id.to_string()))
            .send()
            .await
            .map_err(|e| Error::MetadataStore(format!("{}", DisplayErrorContext(&e))))?;
        Ok(response.item().map(profile_from_item))
    }
}

// =============================================================================
// Attribute mapping
// =============================================================================

fn attr_s(item: &Item, name: &str) -> String {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .cloned()
        .unwrap_or_default()
}

fn attr_u64(item: &Item, name: &str) -> Option<u64> {
    item.get(name)
        .and_then(|v| v.as_n().ok())
        .and_then(|n| n.parse().ok())
}

fn attr_f64(item: &Item, name: &str) -> f64 {
    item.get(name)
        .and_then(|v| v.as_n().ok())
        .and_then(|n| n.parse().ok())
        .unwrap_or(0.0)
}

/// String sequences appear either as a list of strings or a string set
fn attr_strings(item: &Item, name: &str) -> Vec<String> {
    match item.get(name) {
        Some(AttributeValue::L(values)) => values
            .iter()
            .filter_map(|v| v.as_s().ok().cloned())
            .collect(),
        Some(AttributeValue::Ss(values)) => values.clone(),
        _ => Vec::new(),
    }
}

fn image_from_item(item: &Item) -> ImageRecord {
    let key = attr_s(item, "ImageId");
    let filename = match attr_s(item, "filename") {
        f if !f.is_empty() => f,
        _ => key.rsplit('/').next().unwrap_or_default().to_string(),
    };
    let analysis = item
        .get("rekognitionDetails")
        .and_then(|v| v.as_m().ok())
        .map(analysis_from_map)
        .unwrap_or_default();
    // Older items carry the face count only inside the analysis block
    let faces = attr_u64(item, "faces")
        .map(|n| n as u32)
        .unwrap_or(analysis.faces);

    ImageRecord {
        id: key.clone(),
        filename,
        url: attr_s(item, "url"),
        size: attr_u64(item, "size").unwrap_or(0),
        last_modified: attr_s(item, "lastModified"),
        labels: attr_strings(item, "labels"),
        faces,
        location: attr_s(item, "location"),
        analysis,
        key,
    }
}

fn analysis_from_map(map: &Item) -> AnalysisDetails {
    let labels = match map.get("labels") {
        Some(AttributeValue::L(values)) => values
            .iter()
            .filter_map(|v| v.as_m().ok())
            .map(|m| LabelDetection {
                name: attr_s(m, "name"),
                confidence: attr_f64(m, "confidence"),
            })
            .collect(),
        _ => Vec::new(),
    };
    let celebrities = match map.get("celebrities") {
        Some(AttributeValue::L(values)) => values
            .iter()
            .filter_map(|v| v.as_m().ok())
            .map(|m| CelebrityDetection {
                name: attr_s(m, "name"),
                confidence: attr_f64(m, "confidence"),
            })
            .collect(),
        _ => Vec::new(),
    };

    AnalysisDetails {
        labels,
        faces: attr_u64(map, "faces").map(|n| n as u32).unwrap_or(0),
        celebrities,
        text: attr_strings(map, "text"),
        analyzed_at: attr_s(map, "analyzedAt"),
    }
}

fn user_to_item(profile: &UserProfile) -> Item {
    let mut item = Item::new();
    let mut put = |name: &str, value: &str| {
        item.insert(name.to_string(), AttributeValue::S(value.to_string()));
    };
    put("UserId", &profile.user_id);
    put("Email", &profile.email);
    put("FirstName", &profile.first_name);
    put("LastName", &profile.last_name);
    put("ProfilePicture", &profile.profile_picture);
    put("Provider", &profile.provider);
    put("LastLogin", &profile.last_login);
    put("CreatedAt", &profile.created_at);
    put("UpdatedAt", &profile.updated_at);
    item
}

fn profile_from_item(item: &Item) -> UserProfile {
    UserProfile {
        user_id: attr_s(item, "UserId"),
        email: attr_s(item, "Email"),
        first_name: attr_s(item, "FirstName"),
        last_name: attr_s(item, "LastName"),
        profile_picture: attr_s(item, "ProfilePicture"),
        provider: attr_s(item, "Provider"),
        last_login: attr_s(item, "LastLogin"),
        created_at: attr_s(item, "CreatedAt"),
        updated_at: attr_s(item, "UpdatedAt"),
    }
}
