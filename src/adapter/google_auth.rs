//! OAuth access tokens for Google APIs, minted from a service-account key
//! with the JWT bearer grant and cached until shortly before they expire.

use std::fmt;
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::model::error::NotifyError;

pub const FCM_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;

/// The fields of a downloaded service-account JSON key that matter here.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub project_id: Option<String>,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read service account key {path}"))?;
        serde_json::from_str(&raw).with_context(|| format!("invalid service account key {path}"))
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + TimeDelta::try_seconds(REFRESH_MARGIN_SECS).unwrap_or_default() < self.expires_at
    }
}

#[derive(Clone)]
pub struct AccessTokenProvider {
    client: reqwest::Client,
    client_email: String,
    token_uri: String,
    scope: String,
    encoding_key: EncodingKey,
    cache: Arc<Mutex<Option<CachedToken>>>,
}

impl fmt::Debug for AccessTokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessTokenProvider")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl AccessTokenProvider {
    pub fn new(client: reqwest::Client, key: &ServiceAccountKey, scope: &str) -> anyhow::Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .context("failed to parse service account private key")?;
        Ok(Self {
            client,
            client_email: key.client_email.clone(),
            token_uri: key.token_uri.clone(),
            scope: scope.to_owned(),
            encoding_key,
            cache: Arc::default(),
        })
    }

    /// A token valid for at least the refresh margin. Concurrent callers
    /// share one refresh.
    pub async fn access_token(&self) -> Result<String, NotifyError> {
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref() {
            if cached.is_fresh(Utc::now()) {
                return Ok(cached.token.clone());
            }
        }
        let fresh = self.fetch().await?;
        let token = fresh.token.clone();
        *cache = Some(fresh);
        Ok(token)
    }

    /// Drops the cached token, e.g. after the API answered 401 with it.
    pub async fn invalidate(&self) {
        *self.cache.lock().await = None;
    }

    #[tracing::instrument(level = "debug", skip(self), fields(iss = %self.client_email))]
    async fn fetch(&self) -> Result<CachedToken, NotifyError> {
        let now = Utc::now();
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: &self.scope,
            aud: &self.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)?;
        let form = serde_urlencoded::to_string(vec![
            ("grant_type", JWT_BEARER_GRANT),
            ("assertion", assertion.as_str()),
        ])?;

        let resp = self
            .client
            .post(&self.token_uri)
            .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(form)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::TokenRejected { status, body });
        }

        let granted: TokenResponse = resp.json().await?;
        tracing::debug!("access token granted for {}s", granted.expires_in);
        Ok(CachedToken {
            token: granted.access_token,
            expires_at: now + TimeDelta::try_seconds(granted.expires_in).unwrap_or_default(),
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::ServiceAccountKey;

    pub const TEST_PRIVATE_KEY: &str = include_str!("testdata/service_account_key.pem");
    pub const TEST_PUBLIC_KEY: &str = include_str!("testdata/service_account_key.pub.pem");

    pub fn service_account(token_uri: &str) -> ServiceAccountKey {
        ServiceAccountKey {
            client_email: "push@bookings-app.iam.gserviceaccount.com".to_string(),
            private_key: TEST_PRIVATE_KEY.to_string(),
            token_uri: token_uri.to_string(),
            project_id: Some("bookings-app".to_string()),
        }
    }
}
