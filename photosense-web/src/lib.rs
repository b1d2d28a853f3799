//! photosense-web library interface
//!
//! Exposes `AppState` and the router for integration testing.

pub mod api;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use photosense_common::config::Config;

use crate::api::metadata::MetadataSummary;
use crate::services::{IdentityClient, MetadataStore, Notifier, ObjectStore};

/// Application state shared across handlers
///
/// Every collaborator client is constructed once at startup and injected
/// here; handlers never build clients or read the environment themselves.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub identity: IdentityClient,
    pub storage: Arc<dyn ObjectStore>,
    pub metadata: MetadataStore,
    pub notifier: Notifier,
    /// Cached table-wide metadata rollup with its computation time
    pub aggregate_cache: Arc<RwLock<Option<(Instant, MetadataSummary)>>>,
}

impl AppState {
    pub fn new(
        config: Config,
        identity: IdentityClient,
        storage: Arc<dyn ObjectStore>,
        metadata: MetadataStore,
        notifier: Notifier,
    ) -> Self {
        Self {
            config: Arc::new(config),
            identity,
            storage,
            metadata,
            notifier,
            aggregate_cache: Arc::new(RwLock::new(None)),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    // Protected routes (require a verified bearer token)
    let protected = Router::new()
        .route("/api/images", get(api::list_images))
        .route("/api/upload", post(api::create_upload_url))
        .route("/api/collections", get(api::list_collections))
        .route("/api/collections/:id", get(api::get_collection))
        .route("/api/metadata/aggregate", get(api::aggregate_metadata))
        .route("/api/users", post(api::upsert_user).get(api::get_user_details))
        .route(
            "/api/notifications/subscribe",
            post(api::subscribe).get(api::subscription_status),
        )
        .route("/api/notifications/unsubscribe", post(api::unsubscribe))
        .route("/api/notifications/poll", post(api::poll_notifications))
        .route("/api/notifications/ack", post(api::acknowledge_notification))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    // Public routes: health, the pub/sub handshake, and the session
    // endpoints that run before/after a token exists
    let public = Router::new()
        .route("/api/auth/session", post(api::create_session))
        .route("/api/auth/signout", post(api::sign_out))
        .route("/api/notifications/webhook", post(api::sns_webhook))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
