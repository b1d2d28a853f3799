//! Integration tests for the photosense-web router
//!
//! These run against a fully built router with real (but credential-less)
//! SDK clients; only paths that never reach a collaborator are exercised:
//! health, authentication rejection, and webhook payload handling.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use tower::util::ServiceExt; // for `oneshot`

use photosense_common::config::{AwsConfig, Config, IdentityConfig, Limits};
use photosense_web::services::{IdentityClient, MetadataStore, Notifier, S3ObjectStore};
use photosense_web::{build_router, AppState};

fn test_config() -> Config {
    Config {
        bind: "127.0.0.1:0".to_string(),
        aws: AwsConfig {
            region: "eu-west-1".to_string(),
            bucket: "photosense-test".to_string(),
            image_table: "ImageMetadata".to_string(),
            user_table: "UserDetails".to_string(),
            account_id: "123456789012".to_string(),
            topic_prefix: "user-notify-".to_string(),
        },
        identity: IdentityConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            service_key: "test-key".to_string(),
        },
        limits: Limits {
            presign_ttl_secs: 900,
            aggregate_cache_secs: 900,
        },
    }
}

async fn setup_app() -> axum::Router {
    let config = test_config();
    let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.aws.region.clone()))
        .no_credentials()
        .load()
        .await;

    let identity = IdentityClient::new(&config.identity).expect("identity client");
    let storage = Arc::new(S3ObjectStore::new(
        aws_sdk_s3::Client::new(&sdk_config),
        config.aws.bucket.clone(),
    ));
    let metadata = MetadataStore::new(
        aws_sdk_dynamodb::Client::new(&sdk_config),
        config.aws.image_table.clone(),
        config.aws.user_table.clone(),
    );
    let notifier = Notifier::new(
        aws_sdk_sns::Client::new(&sdk_config),
        aws_sdk_sqs::Client::new(&sdk_config),
        &config.aws,
    )
    .expect("notifier");

    build_router(AppState::new(config, identity, storage, metadata, notifier))
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("should read body");
    serde_json::from_slice(&bytes).expect("should parse JSON")
}

// =============================================================================
// Health endpoint
// =============================================================================

#[tokio::test]
async fn health_endpoint_requires_no_auth() {
    let app = setup_app().await;

    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "photosense-web");
    assert!(body["version"].is_string());
}

// =============================================================================
// Authentication middleware
// =============================================================================

#[tokio::test]
async fn protected_routes_reject_missing_token() {
    for uri in [
        "/api/images",
        "/api/collections",
        "/api/metadata/aggregate",
    ] {
        let app = setup_app().await;
        let response = app.oneshot(get_request(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "uri: {uri}");

        let body = extract_json(response.into_body()).await;
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }
}

#[tokio::test]
async fn protected_routes_reject_non_bearer_schemes() {
    let app = setup_app().await;
    let request = Request::builder()
        .method("GET")
        .uri("/api/images")
        .header("authorization", "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn signout_without_token_is_unauthorized() {
    let app = setup_app().await;
    let response = app
        .oneshot(post_json("/api/auth/signout", "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Pub/sub webhook
// =============================================================================

#[tokio::test]
async fn webhook_acknowledges_notification_messages() {
    let app = setup_app().await;
    let response = app
        .oneshot(post_json(
            "/api/notifications/webhook",
            r#"{"Type":"Notification","Message":"{\"imageId\":\"users/a_b_c/cat.jpg\"}"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn webhook_rejects_confirmation_without_url() {
    let app = setup_app().await;
    let response = app
        .oneshot(post_json(
            "/api/notifications/webhook",
            r#"{"Type":"SubscriptionConfirmation"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn webhook_rejects_insecure_confirmation_url() {
    let app = setup_app().await;
    let response = app
        .oneshot(post_json(
            "/api/notifications/webhook",
            r#"{"Type":"SubscriptionConfirmation","SubscribeURL":"http://attacker.example/confirm"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Session endpoints
// =============================================================================

#[tokio::test]
async fn session_exchange_requires_code() {
    let app = setup_app().await;
    let response = app
        .oneshot(post_json("/api/auth/session", r#"{"code":"  "}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_routes_are_not_found() {
    let app = setup_app().await;
    let response = app.oneshot(get_request("/api/albums")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
