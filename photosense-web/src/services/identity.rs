//! Identity-provider client
//!
//! Thin REST client for a GoTrue-style hosted auth API. The provider owns
//! the whole credential lifecycle; this service only verifies bearer
//! tokens, exchanges login codes for sessions, and revokes tokens.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use photosense_common::config::IdentityConfig;
use photosense_common::{Error, Result};

const USER_AGENT: &str = concat!("PhotoSense/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The authenticated caller, as reported by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Provider-supplied profile metadata (shape varies per upstream IdP)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
}

impl AuthUser {
    /// Identifier used for storage prefixes and notification channels:
    /// the email when present, otherwise the opaque user id.
    pub fn identifier(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.id)
    }

    pub fn avatar(&self) -> Option<&str> {
        self.user_metadata
            .avatar_url
            .as_deref()
            .or(self.user_metadata.picture.as_deref())
    }
}

/// A session issued by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: String,
    pub user: AuthUser,
}

#[derive(Serialize)]
struct ExchangeRequest<'a> {
    auth_code: &'a str,
}

/// REST client for the hosted identity provider
#[derive(Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl IdentityClient {
    pub fn new(config: &IdentityConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Http(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            service_key: config.service_key.clone(),
        })
    }

    /// Verify a bearer token and return the user it belongs to
    pub async fn get_user(&self, token: &str) -> Result<AuthUser> {
        let response = self
            .http
            .get(format!("{}/auth/v1/user", self.base_url))
            .bearer_auth(token)
            .header("apikey", &self.service_key)
            .send()
            .await
            .map_err(|e| Error::Http(format!("identity provider unreachable: {e}")))?;

        match response.status() {
            reqwest::StatusCode::OK => response
                .json::<AuthUser>()
                .await
                .map_err(|e| Error::Auth(format!("malformed user response: {e}"))),
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                Err(Error::Auth("invalid or expired token".to_string()))
            }
            status => Err(Error::Auth(format!(
                "identity provider returned {status}"
            ))),
        }
    }

    /// Exchange a login code for a session
    pub async fn exchange_code(&self, code: &str) -> Result<Session> {
        let response = self
            .http
            .post(format!("{}/auth/v1/token?grant_type=pkce", self.base_url))
            .header("apikey", &self.service_key)
            .json(&ExchangeRequest { auth_code: code })
            .send()
            .await
            .map_err(|e| Error::Http(format!("identity provider unreachable: {e}")))?;

        if response.status() == reqwest::StatusCode::OK {
            response
                .json::<Session>()
                .await
                .map_err(|e| Error::Auth(format!("malformed session response: {e}")))
        } else {
            Err(Error::Auth(format!(
                "code exchange rejected: {}",
                response.status()
            )))
        }
    }

    /// Revoke the caller's token
    pub async fn sign_out(&self, token: &str) -> Result<()> {
        let response = self
            .http
            .post(format!("{}/auth/v1/logout", self.base_url))
            .bearer_auth(token)
            .header("apikey", &self.service_key)
            .send()
            .await
            .map_err(|e| Error::Http(format!("identity provider unreachable: {e}")))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Error::Auth(format!(
                "sign-out rejected: {}",
                response.status()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_prefers_email() {
        let user: AuthUser = serde_json::from_str(
            r#"{"id":"u-1","email":"a@b.c","user_metadata":{"name":"A B"}}"#,
        )
        .unwrap();
        assert_eq!(user.identifier(), "a@b.c");
    }

    #[test]
    fn identifier_falls_back_to_id() {
        let user: AuthUser = serde_json::from_str(r#"{"id":"u-1"}"#).unwrap();
        assert_eq!(user.identifier(), "u-1");
        assert!(user.avatar().is_none());
    }

    #[test]
    fn avatar_falls_back_to_picture() {
        let user: AuthUser = serde_json::from_str(
            r#"{"id":"u-1","user_metadata":{"picture":"https://img.example/p.png"}}"#,
        )
        .unwrap();
        assert_eq!(user.avatar(), Some("https://img.example/p.png"));
    }
}
