use crate::app::AppEnv;
use crate::model::callback::PaymentCallback;
use crate::model::error::AppError;
use crate::services::i_booking_store::BookingStore;
use crate::services::i_push_sender::PushSender;
use axum::body::Bytes;
use axum::extract::{Path, State};
use std::sync::Arc;

/// Provider callback for one booking. A declined payment is still a
/// successful delivery from the provider's point of view, so it answers 200.
#[tracing::instrument(level = "debug", skip(app, payload))]
pub async fn mpesa_callback_handler<Store, Sender>(
    State(app): State<Arc<AppEnv<Store, Sender>>>,
    Path(booking_id): Path<String>,
    payload: Bytes,
) -> Result<&'static str, AppError>
where
    Store: BookingStore,
    Sender: PushSender,
{
    let callback = PaymentCallback::from_slice(&payload)
        .inspect_err(|e| tracing::warn!("rejected callback for booking {booking_id}: {e}"))?;

    let outcome = app
        .callback_processor
        .process(&booking_id, &callback)
        .await
        .inspect_err(|e| tracing::error!("error while handling callback: {e:?}"))?;

    Ok(outcome.message())
}
