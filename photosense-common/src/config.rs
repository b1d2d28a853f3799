//! Configuration loading
//!
//! All configuration is resolved once at process start into an owned
//! [`Config`]; nothing reads the environment after startup. Resolution
//! priority per value: environment variable, then TOML config file, then
//! compiled default. Required values with no source fail the load with a
//! message naming every missing key.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::{Error, Result};

/// Environment variable naming the config file path
pub const CONFIG_PATH_ENV: &str = "PHOTOSENSE_CONFIG";

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen address, e.g. "127.0.0.1:8080"
    pub bind: String,
    pub aws: AwsConfig,
    pub identity: IdentityConfig,
    pub limits: Limits,
}

/// Managed-cloud collaborator settings
#[derive(Debug, Clone)]
pub struct AwsConfig {
    pub region: String,
    /// Object-storage bucket holding user uploads
    pub bucket: String,
    /// Key-value table written by the vision pipeline
    pub image_table: String,
    /// Key-value table holding user profiles
    pub user_table: String,
    /// Account id used to derive queue URLs
    pub account_id: String,
    /// Prefix for per-user notification topics and queues
    pub topic_prefix: String,
}

/// Identity-provider settings (GoTrue-style REST API)
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub base_url: String,
    pub service_key: String,
}

#[derive(Debug, Clone)]
pub struct Limits {
    /// Lifetime of issued pre-signed URLs, in seconds
    pub presign_ttl_secs: u64,
    /// Lifetime of the cached metadata aggregate, in seconds
    pub aggregate_cache_secs: u64,
}

/// On-disk TOML shape; every field optional so env can fill the gaps
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    bind: Option<String>,
    #[serde(default)]
    aws: FileAwsConfig,
    #[serde(default)]
    identity: FileIdentityConfig,
    #[serde(default)]
    limits: FileLimits,
}

#[derive(Debug, Default, Deserialize)]
struct FileAwsConfig {
    region: Option<String>,
    bucket: Option<String>,
    image_table: Option<String>,
    user_table: Option<String>,
    account_id: Option<String>,
    topic_prefix: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FileIdentityConfig {
    base_url: Option<String>,
    service_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FileLimits {
    presign_ttl_secs: Option<u64>,
    aggregate_cache_secs: Option<u64>,
}

impl Config {
    /// Load configuration from the given TOML file (or the default
    /// location) with environment-variable overrides.
    ///
    /// Fails fast: a missing required value is reported at startup, never
    /// deferred to the first request that needs it.
    pub fn load(explicit_path: Option<&Path>) -> Result<Config> {
        let file = match resolve_config_path(explicit_path) {
            Some(path) => {
                info!("Loading config file: {}", path.display());
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    Error::Config(format!("cannot read {}: {}", path.display(), e))
                })?;
                toml::from_str::<FileConfig>(&content).map_err(|e| {
                    Error::Config(format!("cannot parse {}: {}", path.display(), e))
                })?
            }
            None => FileConfig::default(),
        };

        let mut missing = Vec::new();
        let mut required = |env_name: &str, file_value: Option<String>| -> String {
            match env_or(env_name, file_value) {
                Some(v) => v,
                None => {
                    missing.push(env_name.to_string());
                    String::new()
                }
            }
        };

        let config = Config {
            bind: env_or("PHOTOSENSE_BIND", file.bind)
                .unwrap_or_else(|| "127.0.0.1:8080".to_string()),
            aws: AwsConfig {
                region: required("PHOTOSENSE_REGION", file.aws.region),
                bucket: required("PHOTOSENSE_BUCKET", file.aws.bucket),
                image_table: required("PHOTOSENSE_IMAGE_TABLE", file.aws.image_table),
                user_table: required("PHOTOSENSE_USER_TABLE", file.aws.user_table),
                account_id: required("PHOTOSENSE_ACCOUNT_ID", file.aws.account_id),
                topic_prefix: env_or("PHOTOSENSE_TOPIC_PREFIX", file.aws.topic_prefix)
                    .unwrap_or_else(|| "user-notify-".to_string()),
            },
            identity: IdentityConfig {
                base_url: required("PHOTOSENSE_IDENTITY_URL", file.identity.base_url),
                service_key: required("PHOTOSENSE_IDENTITY_KEY", file.identity.service_key),
            },
            limits: Limits {
                presign_ttl_secs: env_u64("PHOTOSENSE_PRESIGN_TTL_SECS")?
                    .or(file.limits.presign_ttl_secs)
                    .unwrap_or(900),
                aggregate_cache_secs: env_u64("PHOTOSENSE_AGGREGATE_CACHE_SECS")?
                    .or(file.limits.aggregate_cache_secs)
                    .unwrap_or(900),
            },
        };

        if !missing.is_empty() {
            return Err(Error::Config(format!(
                "missing configuration values: {}. Set the environment variables or add the \
                 corresponding keys to the config file.",
                missing.join(", ")
            )));
        }

        Ok(config)
    }
}

/// Config file resolution: explicit path, then env var, then the platform
/// config directory (only if the file exists there).
fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }
    let default = dirs::config_dir()?.join("photosense").join("config.toml");
    default.exists().then_some(default)
}

fn env_or(name: &str, fallback: Option<String>) -> Option<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => fallback,
    }
}

fn env_u64(name: &str) -> Result<Option<u64>> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => v
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| Error::Config(format!("{} must be an integer, got {:?}", name, v))),
        _ => Ok(None),
    }
}
