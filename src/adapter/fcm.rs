use std::time::Duration;

use serde::Serialize;

use crate::model::PushMessage;

// https://firebase.google.com/docs/reference/fcm/rest/v1/projects.messages/send
#[derive(Debug, Serialize)]
pub struct FcmRequest<'a> {
    pub message: FcmMessage<'a>,
}

#[derive(Debug, Serialize)]
pub struct FcmMessage<'a> {
    pub token: &'a str,
    pub notification: FcmNotification<'a>,
}

#[derive(Debug, Serialize)]
pub struct FcmNotification<'a> {
    pub title: &'a str,
    pub body: &'a str,
}

pub fn create_fcm_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    let client = reqwest::ClientBuilder::new()
        .timeout(timeout)
        .tcp_keepalive(Duration::from_secs(60))
        .build()?;
    Ok(client)
}

pub fn send_url(base_url: &str, project_id: &str) -> String {
    format!(
        "{}/v1/projects/{project_id}/messages:send",
        base_url.trim_end_matches('/')
    )
}

pub fn make_fcm_payload(msg: &PushMessage) -> FcmRequest<'_> {
    FcmRequest {
        message: FcmMessage {
            token: &msg.token,
            notification: FcmNotification {
                title: &msg.title,
                body: &msg.body,
            },
        },
    }
}

#[test]
fn test_fcm_payload_shape() -> anyhow::Result<()> {
    let msg = PushMessage {
        token: "tok-1".to_string(),
        title: "Booking Successful".to_string(),
        body: "Your booking has been confirmed.".to_string(),
    };
    let json = serde_json::to_value(make_fcm_payload(&msg))?;
    assert_eq!(
        json,
        serde_json::json!({
            "message": {
                "token": "tok-1",
                "notification": {
                    "title": "Booking Successful",
                    "body": "Your booking has been confirmed."
                }
            }
        })
    );
    assert_eq!(
        send_url("https://fcm.googleapis.com/", "bookings-app"),
        "https://fcm.googleapis.com/v1/projects/bookings-app/messages:send"
    );
    Ok(())
}
