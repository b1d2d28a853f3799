//! Collaborator adapters
//!
//! Each module is a thin, typed pass-through to one managed service:
//! identity provider, object storage, key-value metadata table, and the
//! pub/sub + queue pair. Clients are constructed once at startup and shared
//! through `AppState`.

pub mod identity;
pub mod metadata;
pub mod notify;
pub mod storage;

pub use identity::{AuthUser, IdentityClient, Session};
pub use metadata::MetadataStore;
pub use notify::{Notifier, QueueMessage};
pub use storage::{ObjectStore, S3ObjectStore, StoredObject};
