//! Common error types for PhotoSense

use thiserror::Error;

/// Common result type for PhotoSense operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the PhotoSense service and its adapters
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Token verification or identity-provider failure
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Object storage (pre-signed URLs, listings) failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Key-value metadata table failure
    #[error("Metadata store error: {0}")]
    MetadataStore(String),

    /// Pub/sub or queue failure
    #[error("Notification error: {0}")]
    Notify(String),

    /// Outbound HTTP failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
