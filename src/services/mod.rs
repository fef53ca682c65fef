pub mod callback_processor;
pub mod fcm_push_sender;
pub mod i_booking_store;
pub mod i_push_sender;
#[cfg(test)]
pub(crate) mod memory;
pub mod notification;
pub mod redis_booking_store;
