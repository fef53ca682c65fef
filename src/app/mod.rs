use crate::services::callback_processor::CallbackProcessor;
use crate::services::fcm_push_sender::FcmPushSender;
use crate::services::i_booking_store::BookingStore;
use crate::services::i_push_sender::PushSender;
use crate::services::redis_booking_store::RedisBookingStore;

/// Everything the HTTP layer needs, built once at startup and shared.
#[derive(Debug, Clone)]
pub struct AppEnv<Store = RedisBookingStore, Sender = FcmPushSender>
where
    Store: BookingStore,
    Sender: PushSender,
{
    pub callback_processor: CallbackProcessor<Store, Sender>,
}

impl<Store, Sender> AppEnv<Store, Sender>
where
    Store: BookingStore,
    Sender: PushSender,
{
    pub fn new(callback_processor: CallbackProcessor<Store, Sender>) -> Self {
        Self { callback_processor }
    }
}
