use crate::model::callback::PaymentCallback;
use crate::model::error::AppError;
use crate::model::{BookingStatus, Transition};

use super::i_booking_store::BookingStore;
use super::i_push_sender::PushSender;
use super::notification::{self, Dispatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    Confirmed,
    Failed,
    /// The booking had already left `pending`; nothing was written or sent.
    AlreadyProcessed,
}

impl CallbackOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            CallbackOutcome::Confirmed => "Booking confirmed",
            CallbackOutcome::Failed => "Booking failed",
            CallbackOutcome::AlreadyProcessed => "Booking already processed",
        }
    }
}

struct NotificationText {
    title: &'static str,
    body: &'static str,
}

const CONFIRMED_TEXT: NotificationText = NotificationText {
    title: "Booking Successful",
    body: "Your booking has been confirmed.",
};

const FAILED_TEXT: NotificationText = NotificationText {
    title: "Booking Failed",
    body: "Your booking could not be completed. Please try again.",
};

/// Applies a payment callback to its booking and tells the booking's owner.
#[derive(Debug, Clone)]
pub struct CallbackProcessor<Store, Sender> {
    store: Store,
    sender: Sender,
}

impl<Store, Sender> CallbackProcessor<Store, Sender>
where
    Store: BookingStore,
    Sender: PushSender,
{
    pub fn new(store: Store, sender: Sender) -> Self {
        Self { store, sender }
    }

    #[tracing::instrument(
        level = "debug",
        skip(self, callback),
        fields(
            merchant_request_id = callback.merchant_request_id.as_deref().unwrap_or("unknown"),
            checkout_request_id = callback.checkout_request_id.as_deref().unwrap_or("unknown"),
        )
    )]
    pub async fn process(
        &self,
        booking_id: &str,
        callback: &PaymentCallback,
    ) -> Result<CallbackOutcome, AppError> {
        let booking = self
            .store
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| AppError::BookingNotFound(booking_id.to_owned()))?;
        tracing::debug!("booking {booking_id} stored as {:?}", booking.status);

        let (target, outcome, text) = if callback.is_success() {
            (BookingStatus::Confirmed, CallbackOutcome::Confirmed, CONFIRMED_TEXT)
        } else {
            (BookingStatus::Failed, CallbackOutcome::Failed, FAILED_TEXT)
        };
        tracing::info!(
            "payment result for booking {booking_id}: code={:?} desc={:?} receipt={:?}",
            callback.result_code,
            callback.result_desc,
            callback.receipt_number(),
        );

        let transition = self
            .store
            .transition_booking(
                booking_id,
                BookingStatus::Pending,
                target,
                &callback.payment_result(),
            )
            .await?;
        match transition {
            Transition::Applied => {
                tracing::info!("booking {booking_id} is now {target}");
            }
            Transition::Rejected { current } => {
                tracing::info!(
                    "booking {booking_id} already settled as {current:?}, ignoring repeated callback"
                );
                return Ok(CallbackOutcome::AlreadyProcessed);
            }
            Transition::Missing => {
                tracing::warn!("booking {booking_id} disappeared before its status was written");
                return Err(AppError::BookingNotFound(booking_id.to_owned()));
            }
        }

        // the status is committed from here on, notification problems only get logged
        match booking.user_id.as_deref() {
            Some(user_id) => self.dispatch(user_id, &text).await,
            None => tracing::warn!("booking {booking_id} has no userId, nobody to notify"),
        }
        Ok(outcome)
    }

    async fn dispatch(&self, user_id: &str, text: &NotificationText) {
        match notification::notify(&self.store, &self.sender, user_id, text.title, text.body).await
        {
            Ok(Dispatch::Sent) => tracing::info!("notified user {user_id}: {}", text.title),
            Ok(Dispatch::NoToken) => {
                tracing::debug!("user {user_id} has no notification token, skipped")
            }
            Err(e) => tracing::error!("failed to notify user {user_id}: {e:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::services::memory::{MemoryBookingStore, RecordingPushSender};

    fn callback(code: serde_json::Value) -> PaymentCallback {
        let raw = json!({"Body": {"stkCallback": {
            "ResultCode": code,
            "ResultDesc": "desc",
            "CallbackMetadata": {"Item": []}
        }}});
        PaymentCallback::from_slice(raw.to_string().as_bytes()).unwrap()
    }

    fn processor(
        store: &MemoryBookingStore,
        sender: &RecordingPushSender,
    ) -> CallbackProcessor<MemoryBookingStore, RecordingPushSender> {
        CallbackProcessor::new(store.clone(), sender.clone())
    }

    #[tokio::test]
    async fn records_provider_result_with_transition() {
        let store = MemoryBookingStore::default()
            .with_booking("B1", "pending", Some("U1"))
            .with_user("U1", Some("tok-1"));
        let sender = RecordingPushSender::default();

        let outcome = processor(&store, &sender)
            .process("B1", &callback(json!(1032)))
            .await
            .unwrap();

        assert_eq!(outcome, CallbackOutcome::Failed);
        assert_eq!(store.booking_field("B1", "resultCode").as_deref(), Some("1032"));
        assert_eq!(store.booking_field("B1", "resultDesc").as_deref(), Some("desc"));
    }

    #[tokio::test]
    async fn booking_without_owner_still_transitions() {
        let store = MemoryBookingStore::default().with_booking("B1", "pending", None);
        let sender = RecordingPushSender::default();

        let outcome = processor(&store, &sender)
            .process("B1", &callback(json!(0)))
            .await
            .unwrap();

        assert_eq!(outcome, CallbackOutcome::Confirmed);
        assert_eq!(store.booking_status("B1").as_deref(), Some("confirmed"));
        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn push_failure_does_not_undo_transition() {
        let store = MemoryBookingStore::default()
            .with_booking("B1", "pending", Some("U1"))
            .with_user("U1", Some("stale-token"));
        let sender = RecordingPushSender::failing();

        let outcome = processor(&store, &sender)
            .process("B1", &callback(json!(0)))
            .await
            .unwrap();

        assert_eq!(outcome, CallbackOutcome::Confirmed);
        assert_eq!(store.booking_status("B1").as_deref(), Some("confirmed"));
    }

    #[tokio::test]
    async fn status_set_elsewhere_is_left_alone() {
        let store = MemoryBookingStore::default()
            .with_booking("B1", "cancelled", Some("U1"))
            .with_user("U1", Some("tok-1"));
        let sender = RecordingPushSender::default();

        let outcome = processor(&store, &sender)
            .process("B1", &callback(json!(0)))
            .await
            .unwrap();

        assert_eq!(outcome, CallbackOutcome::AlreadyProcessed);
        assert_eq!(store.booking_status("B1").as_deref(), Some("cancelled"));
        assert_eq!(store.writes(), 0);
        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn unknown_booking_is_not_found() {
        let store = MemoryBookingStore::default();
        let sender = RecordingPushSender::default();

        let err = processor(&store, &sender)
            .process("nope", &callback(json!(0)))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BookingNotFound(id) if id == "nope"));
        assert_eq!(store.writes(), 0);
    }
}
