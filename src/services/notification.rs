use crate::model::error::NotifyError;
use crate::model::{PushMessage, User};

use super::i_booking_store::BookingStore;
use super::i_push_sender::PushSender;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Sent,
    /// The user is unknown or has no registered token; nothing was sent.
    NoToken,
}

/// Sends `title`/`body` to the user's registered device, if there is one.
#[tracing::instrument(level = "debug", skip(store, sender, body))]
pub async fn notify<Store, Sender>(
    store: &Store,
    sender: &Sender,
    user_id: &str,
    title: &str,
    body: &str,
) -> Result<Dispatch, NotifyError>
where
    Store: BookingStore,
    Sender: PushSender,
{
    let user = store.get_user(user_id).await?;
    let Some(token) = user.as_ref().and_then(User::notification_token) else {
        tracing::debug!("no notification token registered for user {user_id}");
        return Ok(Dispatch::NoToken);
    };

    let message = PushMessage {
        token: token.to_owned(),
        title: title.to_owned(),
        body: body.to_owned(),
    };
    sender.send(&message).await?;
    Ok(Dispatch::Sent)
}
