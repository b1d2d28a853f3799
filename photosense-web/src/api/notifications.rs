//! Notification endpoints
//!
//! Delivery is a pass-through over the managed pub/sub + queue pair: the
//! client subscribes an endpoint to its per-user topic, polls its queue
//! for processed-upload messages, and acknowledges what it has displayed.
//! The webhook completes the topic's subscription-confirmation handshake
//! and therefore cannot require authentication.

use axum::{
    extract::{Extension, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::users::StatusResponse;
use crate::error::{ApiError, ApiResult};
use crate::services::{AuthUser, QueueMessage};
use crate::AppState;

const POLL_BATCH: i32 = 5;

/// Endpoint protocols the provider supports for user subscriptions
const SUPPORTED_PROTOCOLS: [&str; 4] = ["email", "sms", "https", "http"];

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    /// Accepts the legacy field name used by earlier clients
    #[serde(alias = "subscriptionType")]
    pub protocol: String,
    pub endpoint: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeResponse {
    pub success: bool,
    pub topic_arn: String,
    pub subscription_arn: String,
    pub pending_confirmation: bool,
}

/// POST /api/notifications/subscribe
pub async fn subscribe(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<SubscribeRequest>,
) -> ApiResult<Json<SubscribeResponse>> {
    let protocol = request.protocol.trim().to_lowercase();
    let endpoint = request.endpoint.trim();
    if endpoint.is_empty() {
        return Err(ApiError::BadRequest("endpoint is required".to_string()));
    }
    if !SUPPORTED_PROTOCOLS.contains(&protocol.as_str()) {
        return Err(ApiError::BadRequest(format!(
            "unsupported subscription protocol: {protocol}"
        )));
    }

    let topic_arn = state.notifier.ensure_topic(user.identifier()).await?;
    let status = state
        .notifier
        .subscribe(&topic_arn, &protocol, endpoint)
        .await?;

    Ok(Json(SubscribeResponse {
        success: true,
        topic_arn,
        subscription_arn: status.subscription_arn,
        pending_confirmation: status.pending_confirmation,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatusResponse {
    pub success: bool,
    pub has_subscription: bool,
    pub subscriptions: Vec<crate::services::notify::SubscriptionInfo>,
}

/// GET /api/notifications/subscribe
pub async fn subscription_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<SubscriptionStatusResponse>> {
    let Some(topic_arn) = state.notifier.find_topic(user.identifier()).await? else {
        return Ok(Json(SubscriptionStatusResponse {
            success: true,
            has_subscription: false,
            subscriptions: Vec::new(),
        }));
    };

    let subscriptions = state.notifier.subscriptions(&topic_arn).await?;
    Ok(Json(SubscriptionStatusResponse {
        success: true,
        has_subscription: !subscriptions.is_empty(),
        subscriptions,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsubscribeRequest {
    pub subscription_arn: String,
}

/// POST /api/notifications/unsubscribe
pub async fn unsubscribe(
    State(state): State<AppState>,
    Extension(_user): Extension<AuthUser>,
    Json(request): Json<UnsubscribeRequest>,
) -> ApiResult<Json<StatusResponse>> {
    if request.subscription_arn.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "subscriptionArn is required".to_string(),
        ));
    }
    state
        .notifier
        .unsubscribe(request.subscription_arn.trim())
        .await?;

    Ok(Json(StatusResponse {
        success: true,
        message: "Unsubscribed".to_string(),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResponse {
    pub success: bool,
    pub queue_url: String,
    pub messages: Vec<QueueMessage>,
}

/// POST /api/notifications/poll
pub async fn poll_notifications(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<PollResponse>> {
    let messages = state
        .notifier
        .receive(user.identifier(), POLL_BATCH)
        .await?;

    Ok(Json(PollResponse {
        success: true,
        queue_url: state.notifier.queue_url(user.identifier()),
        messages,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AckRequest {
    pub receipt_handle: String,
}

/// POST /api/notifications/ack
pub async fn acknowledge_notification(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<AckRequest>,
) -> ApiResult<Json<StatusResponse>> {
    if request.receipt_handle.trim().is_empty() {
        return Err(ApiError::BadRequest("receiptHandle is required".to_string()));
    }
    state
        .notifier
        .acknowledge(user.identifier(), request.receipt_handle.trim())
        .await?;

    Ok(Json(StatusResponse {
        success: true,
        message: "Notification acknowledged".to_string(),
    }))
}

/// Envelope the pub/sub service POSTs to subscribed HTTPS endpoints
#[derive(Debug, Deserialize)]
pub struct TopicEnvelope {
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "Message", default)]
    pub message: Option<String>,
    #[serde(rename = "SubscribeURL", default)]
    pub subscribe_url: Option<String>,
    #[serde(rename = "TopicArn", default)]
    pub topic_arn: Option<String>,
    #[serde(rename = "Subject", default)]
    pub subject: Option<String>,
}

/// POST /api/notifications/webhook
///
/// Unauthenticated by necessity: the pub/sub service calls it directly.
/// Confirmation requests are completed by fetching the supplied URL;
/// notification deliveries are logged and acknowledged with 200 (the
/// queue, not this endpoint, is the durable delivery path).
pub async fn sns_webhook(
    State(state): State<AppState>,
    Json(envelope): Json<TopicEnvelope>,
) -> ApiResult<Json<StatusResponse>> {
    match envelope.kind.as_str() {
        "SubscriptionConfirmation" => {
            let url = envelope.subscribe_url.ok_or_else(|| {
                ApiError::BadRequest("confirmation without SubscribeURL".to_string())
            })?;
            state.notifier.confirm_subscription(&url).await?;
            Ok(Json(StatusResponse {
                success: true,
                message: "Subscription confirmed".to_string(),
            }))
        }
        "Notification" => {
            info!(
                topic = envelope.topic_arn.as_deref().unwrap_or("unknown"),
                subject = envelope.subject.as_deref().unwrap_or(""),
                "Received topic notification: {}",
                envelope.message.as_deref().unwrap_or("")
            );
            Ok(Json(StatusResponse {
                success: true,
                message: "Notification received".to_string(),
            }))
        }
        _ => Ok(Json(StatusResponse {
            success: true,
            message: "Message received".to_string(),
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_parses_confirmation_payload() {
        let envelope: TopicEnvelope = serde_json::from_str(
            r#"{
                "Type": "SubscriptionConfirmation",
                "SubscribeURL": "https://sns.eu-west-1.amazonaws.com/?Action=ConfirmSubscription",
                "TopicArn": "arn:aws:sns:eu-west-1:123456789012:user-notify-a_b_c"
            }"#,
        )
        .unwrap();
        assert_eq!(envelope.kind, "SubscriptionConfirmation");
        assert!(envelope.subscribe_url.unwrap().starts_with("https://"));
        assert!(envelope.message.is_none());
    }

    #[test]
    fn subscribe_request_accepts_legacy_field_name() {
        let request: SubscribeRequest = serde_json::from_str(
            r#"{"subscriptionType": "email", "endpoint": "a@b.c"}"#,
        )
        .unwrap();
        assert_eq!(request.protocol, "email");
    }
}
