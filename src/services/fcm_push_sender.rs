use http::StatusCode;

use crate::adapter::fcm;
use crate::adapter::google_auth::AccessTokenProvider;
use crate::model::error::NotifyError;
use crate::model::PushMessage;

use super::i_push_sender::PushSender;

/// Firebase Cloud Messaging over the HTTP v1 API, authorised with tokens
/// minted from the service account.
#[derive(Debug, Clone)]
pub struct FcmPushSender {
    client: reqwest::Client,
    send_url: reqwest::Url,
    tokens: AccessTokenProvider,
}

impl FcmPushSender {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        project_id: &str,
        tokens: AccessTokenProvider,
    ) -> anyhow::Result<Self> {
        let send_url = reqwest::Url::parse(&fcm::send_url(base_url, project_id))?;
        Ok(Self {
            client,
            send_url,
            tokens,
        })
    }
}

impl PushSender for FcmPushSender {
    #[tracing::instrument(level = "debug", skip(self, message), fields(title = %message.title))]
    async fn send(&self, message: &PushMessage) -> Result<(), NotifyError> {
        let access_token = self.tokens.access_token().await?;
        let resp = self
            .client
            .post(self.send_url.clone())
            .bearer_auth(&access_token)
            .json(&fcm::make_fcm_payload(message))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            if status == StatusCode::UNAUTHORIZED {
                // revoked or expired early; mint a new one on the next send
                self.tokens.invalidate().await;
            }
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected { status, body });
        }
        tracing::debug!("fcm accepted message");
        Ok(())
    }
}
