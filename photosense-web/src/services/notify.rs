//! Notification adapter: per-user pub/sub topic + polling queue
//!
//! The vision pipeline publishes a message to a per-user topic when an
//! upload finishes processing; a matching queue subscribed to that topic
//! buffers the messages until the client polls them down. Topic and queue
//! names share one derivation with the pipeline, so both sides land on the
//! same channel.

use std::time::Duration;

use aws_sdk_sqs::operation::receive_message::ReceiveMessageError;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use photosense_common::config::AwsConfig;
use photosense_common::user::user_key;
use photosense_common::{Error, Result};

/// SQS caps a single receive at ten messages
const MAX_RECEIVE_BATCH: i32 = 10;
const RECEIVE_WAIT: Duration = Duration::from_secs(2);
const VISIBILITY_TIMEOUT: Duration = Duration::from_secs(30);

/// A polled queue message, ready for client-side display and acknowledgment
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueMessage {
    pub id: String,
    /// Opaque handle required to delete the message after processing
    pub receipt_handle: String,
    pub body: String,
}

/// A subscription on a user's topic
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionInfo {
    pub endpoint: String,
    pub protocol: String,
    pub status: String,
}

/// Result of a subscribe call
#[derive(Debug, Clone)]
pub struct SubscriptionStatus {
    pub subscription_arn: String,
    pub pending_confirmation: bool,
}

/// Pub/sub + queue client pair
#[derive(Clone)]
pub struct Notifier {
    sns: aws_sdk_sns::Client,
    sqs: aws_sdk_sqs::Client,
    http: reqwest::Client,
    region: String,
    account_id: String,
    topic_prefix: String,
}

impl Notifier {
    pub fn new(
        sns: aws_sdk_sns::Client,
        sqs: aws_sdk_sqs::Client,
        config: &AwsConfig,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Http(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            sns,
            sqs,
            http,
            region: config.region.clone(),
            account_id: config.account_id.clone(),
            topic_prefix: config.topic_prefix.clone(),
        })
    }

    /// Per-user channel name shared by the topic and its queue
    pub fn channel_name(&self, identifier: &str) -> String {
        format!("{}{}", self.topic_prefix, user_key(identifier))
    }

    /// Queue URL for a user's notification queue
    pub fn queue_url(&self, identifier: &str) -> String {
        format!(
            "https://sqs.{}.amazonaws.com/{}/{}",
            self.region,
            self.account_id,
            self.channel_name(identifier)
        )
    }

    /// Find the ARN of a user's topic, if it exists
    pub async fn find_topic(&self, identifier: &str) -> Result<Option<String>> {
        let name = self.channel_name(identifier);
        let suffix = format!(":{name}");
        let mut next_token: Option<String> = None;

        loop {
            let response = self
                .sns
                .list_topics()
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| {
                    Error::Notify(format!("{}", aws_sdk_sns::error::DisplayErrorContext(&e)))
                })?;

            for topic in response.topics() {
                if let Some(arn) = topic.topic_arn() {
                    if arn.ends_with(&suffix) {
                        return Ok(Some(arn.to_string()));
                    }
                }
            }

            match response.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => return Ok(None),
            }
        }
    }

    /// Get or create the user's topic
    pub async fn ensure_topic(&self, identifier: &str) -> Result<String> {
        if let Some(arn) = self.find_topic(identifier).await? {
            return Ok(arn);
        }
        let name = self.channel_name(identifier);
        let response = self
            .sns
            .create_topic()
            .name(&name)
            .send()
            .await
            .map_err(|e| Error::Notify(format!("{}", aws_sdk_sns::error::DisplayErrorContext(&e))))?;
        let arn = response
            .topic_arn()
            .ok_or_else(|| Error::Notify(format!("topic {name} created without an ARN")))?;
        info!("Created notification topic {arn}");
        Ok(arn.to_string())
    }

    /// Subscribe an endpoint to a topic. Email and HTTPS endpoints stay
    /// pending until the endpoint confirms the handshake.
    pub async fn subscribe(
        &self,
        topic_arn: &str,
        protocol: &str,
        endpoint: &str,
    ) -> Result<SubscriptionStatus> {
        let response = self
            .sns
            .subscribe()
            .topic_arn(topic_arn)
            .protocol(protocol)
            .endpoint(endpoint)
            .send()
            .await
            .map_err(|e| Error::Notify(format!("{}", aws_sdk_sns::error::DisplayErrorContext(&e))))?;
        let arn = response.subscription_arn().unwrap_or_default().to_string();
        let pending_confirmation = arn.is_empty() || arn == "PendingConfirmation";
        Ok(SubscriptionStatus {
            subscription_arn: arn,
            pending_confirmation,
        })
    }

    /// List subscriptions on a topic
    pub async fn subscriptions(&self, topic_arn: &str) -> Result<Vec<SubscriptionInfo>> {
        let response = self
            .sns
            .list_subscriptions_by_topic()
            .topic_arn(topic_arn)
            .send()
            .await
            .map_err(|e| Error::Notify(format!("{}", aws_sdk_sns::error::DisplayErrorContext(&e))))?;

        Ok(response
            .subscriptions()
            .iter()
            .map(|sub| {
                let arn = sub.subscription_arn().unwrap_or_default();
                SubscriptionInfo {
                    endpoint: sub.endpoint().unwrap_or_default().to_string(),
                    protocol: sub.protocol().unwrap_or_default().to_string(),
                    status: if arn == "PendingConfirmation" {
                        "pending".to_string()
                    } else {
                        "confirmed".to_string()
                    },
                }
            })
            .collect())
    }

    /// Remove a subscription
    pub async fn unsubscribe(&self, subscription_arn: &str) -> Result<()> {
        self.sns
            .unsubscribe()
            .subscription_arn(subscription_arn)
            .send()
            .await
            .map_err(|e| Error::Notify(format!("{}", aws_sdk_sns::error::DisplayErrorContext(&e))))?;
        Ok(())
    }

    /// Poll the user's queue for pending messages.
    ///
    /// A user who has never received a notification has no queue yet;
    /// that is an empty poll, not an error.
    pub async fn receive(&self, identifier: &str, max_messages: i32) -> Result<Vec<QueueMessage>> {
        let queue_url = self.queue_url(identifier);
        let response = self
            .sqs
            .receive_message()
            .queue_url(&queue_url)
            .max_number_of_messages(max_messages.clamp(1, MAX_RECEIVE_BATCH))
            .wait_time_seconds(RECEIVE_WAIT.as_secs() as i32)
            .visibility_timeout(VISIBILITY_TIMEOUT.as_secs() as i32)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(err) => {
                let service_err = err.into_service_error();
                if matches!(service_err, ReceiveMessageError::QueueDoesNotExist(_)) {
                    warn!("Notification queue missing for {queue_url}, returning empty poll");
                    return Ok(Vec::new());
                }
                return Err(Error::Notify(format!(
                    "{}",
                    aws_sdk_sqs::error::DisplayErrorContext(&service_err)
                )));
            }
        };

        Ok(response
            .messages()
            .iter()
            .map(|message| QueueMessage {
                id: message
                    .message_id()
                    .map(str::to_string)
                    .unwrap_or_else(|| Uuid::new_v4().to_string()),
                receipt_handle: message.receipt_handle().unwrap_or_default().to_string(),
                body: message.body().unwrap_or_default().to_string(),
            })
            .collect())
    }

    /// Delete a processed message from the user's queue
    pub async fn acknowledge(&self, identifier: &str, receipt_handle: &str) -> Result<()> {
        self.sqs
            .delete_message()
            .queue_url(self.queue_url(identifier))
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| Error::Notify(format!("{}", aws_sdk_sqs::error::DisplayErrorContext(&e))))?;
        Ok(())
    }

    /// Complete the pub/sub subscription handshake by fetching the
    /// confirmation URL the topic sent us.
    pub async fn confirm_subscription(&self, subscribe_url: &str) -> Result<()> {
        if !subscribe_url.starts_with("https://") {
            return Err(Error::InvalidInput(
                "subscription confirmation URL must be https".to_string(),
            ));
        }
        let response = self
            .http
            .get(subscribe_url)
            .send()
            .await
            .map_err(|e| Error::Http(format!("confirmation fetch failed: {e}")))?;
        if response.status().is_success() {
            info!("Confirmed pub/sub subscription");
            Ok(())
        } else {
            Err(Error::Notify(format!(
                "confirmation rejected: {}",
                response.status()
            )))
        }
    }
}
