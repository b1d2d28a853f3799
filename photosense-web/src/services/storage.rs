//! Object-storage adapter
//!
//! All storage access goes through pre-signed URLs: the service never
//! proxies object bytes. Uploads get a time-limited PUT URL, reads get a
//! time-limited GET URL, and the per-user listing supports the fallback
//! path when the metadata table has no rows yet.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use chrono::{DateTime, Utc};

use photosense_common::{Error, Result};

/// One listed object
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub key: String,
    pub size: u64,
    /// RFC 3339, empty when the store reported no timestamp
    pub last_modified: String,
}

/// Seam over the managed object store
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Pre-signed URL permitting a direct client upload of `key`
    async fn presign_put(&self, key: &str, content_type: &str, ttl: Duration) -> Result<String>;

    /// Pre-signed URL permitting a direct client download of `key`
    async fn presign_get(&self, key: &str, ttl: Duration) -> Result<String>;

    /// All objects under a key prefix
    async fn list_prefix(&self, prefix: &str) -> Result<Vec<StoredObject>>;
}

/// S3-backed implementation of [`ObjectStore`]
#[derive(Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn presign_config(ttl: Duration) -> Result<PresigningConfig> {
        PresigningConfig::expires_in(ttl)
            .map_err(|e| Error::Storage(format!("invalid presign TTL: {e}")))
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn presign_put(&self, key: &str, content_type: &str, ttl: Duration) -> Result<String> {
        let presigned = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(Self::presign_config(ttl)?)
            .await
            .map_err(|e| Error::Storage(format!("{}", DisplayErrorContext(&e))))?;
        Ok(presigned.uri().to_string())
    }

    async fn presign_get(&self, key: &str, ttl: Duration) -> Result<String> {
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(Self::presign_config(ttl)?)
            .await
            .map_err(|e| Error::Storage(format!("{}", DisplayErrorContext(&e))))?;
        Ok(presigned.uri().to_string())
    }

    async fn list_prefix(&self, prefix: &str) -> Result<Vec<StoredObject>> {
        let mut objects = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix);
            if let Some(token) = continuation_token.take() {
                request = request.continuation_token(token);
            }

            let response = request
                .send()
                .await
                .map_err(|e| Error::Storage(format!("{}", DisplayErrorContext(&e))))?;

            for object in response.contents() {
                let Some(key) = object.key() else { continue };
                let last_modified = object
                    .last_modified()
                    .and_then(|t| DateTime::<Utc>::from_timestamp(t.secs(), t.subsec_nanos()))
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_default();
                objects.push(StoredObject {
                    key: key.to_string(),
                    size: object.size().unwrap_or(0).max(0) as u64,
                    last_modified,
                });
            }

            match response.next_continuation_token() {
                Some(token) if response.is_truncated().unwrap_or(false) => {
                    continuation_token = Some(token.to_string());
                }
                _ => break,
            }
        }

        Ok(objects)
    }
}
