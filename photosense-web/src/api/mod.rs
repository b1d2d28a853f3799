//! HTTP API handlers for the PhotoSense service

pub mod auth;
pub mod collections;
pub mod health;
pub mod images;
pub mod metadata;
pub mod notifications;
pub mod session;
pub mod upload;
pub mod users;

pub use auth::auth_middleware;
pub use collections::{get_collection, list_collections};
pub use health::health_routes;
pub use images::list_images;
pub use metadata::aggregate_metadata;
pub use notifications::{
    acknowledge_notification, poll_notifications, sns_webhook, subscribe, subscription_status,
    unsubscribe,
};
pub use session::{create_session, sign_out};
pub use upload::create_upload_url;
pub use users::{get_user_details, upsert_user};
