use crate::model::error::StoreError;
use crate::model::{Booking, BookingStatus, PaymentResult, Transition, User};

pub trait BookingStore: Send + Sync + 'static {
    fn get_booking(
        &self,
        booking_id: &str,
    ) -> impl Future<Output = Result<Option<Booking>, StoreError>> + Send;

    /// Writes `to` only while the booking's status is still `from`.
    fn transition_booking(
        &self,
        booking_id: &str,
        from: BookingStatus,
        to: BookingStatus,
        result: &PaymentResult,
    ) -> impl Future<Output = Result<Transition, StoreError>> + Send;

    fn get_user(&self, user_id: &str) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;
}
