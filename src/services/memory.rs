//! In-process stand-ins for the store and the push service, for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use http::StatusCode;

use crate::model::error::{NotifyError, StoreError};
use crate::model::{Booking, BookingStatus, PaymentResult, PushMessage, Transition, User};

use super::i_booking_store::BookingStore;
use super::i_push_sender::PushSender;

#[derive(Debug, Default)]
struct MemoryState {
    bookings: HashMap<String, HashMap<String, String>>,
    users: HashMap<String, HashMap<String, String>>,
    writes: usize,
}

/// Mirrors the Redis layout: one field map per record.
#[derive(Debug, Clone, Default)]
pub struct MemoryBookingStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryBookingStore {
    pub fn with_booking(self, id: &str, status: &str, user_id: Option<&str>) -> Self {
        let mut fields = HashMap::from([("status".to_string(), status.to_string())]);
        if let Some(user_id) = user_id {
            fields.insert("userId".to_string(), user_id.to_string());
        }
        self.state
            .lock()
            .unwrap()
            .bookings
            .insert(id.to_string(), fields);
        self
    }

    pub fn with_user(self, id: &str, fcm_token: Option<&str>) -> Self {
        let mut fields = HashMap::from([("name".to_string(), id.to_string())]);
        if let Some(token) = fcm_token {
            fields.insert("fcmToken".to_string(), token.to_string());
        }
        self.state.lock().unwrap().users.insert(id.to_string(), fields);
        self
    }

    pub fn booking_field(&self, id: &str, field: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .bookings
            .get(id)
            .and_then(|f| f.get(field).cloned())
    }

    pub fn booking_status(&self, id: &str) -> Option<String> {
        self.booking_field(id, "status")
    }

    pub fn writes(&self) -> usize {
        self.state.lock().unwrap().writes
    }
}

impl BookingStore for MemoryBookingStore {
    async fn get_booking(&self, booking_id: &str) -> Result<Option<Booking>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.bookings.get(booking_id).map(|f| Booking {
            status: f.get("status").cloned(),
            user_id: f.get("userId").cloned(),
        }))
    }

    async fn transition_booking(
        &self,
        booking_id: &str,
        from: BookingStatus,
        to: BookingStatus,
        result: &PaymentResult,
    ) -> Result<Transition, StoreError> {
        let mut state = self.state.lock().unwrap();
        let Some(fields) = state.bookings.get_mut(booking_id) else {
            return Ok(Transition::Missing);
        };
        let current = fields.get("status").cloned();
        if current.as_deref() != Some(from.as_str()) {
            return Ok(Transition::Rejected { current });
        }
        fields.insert("status".to_string(), to.as_str().to_string());
        fields.insert("resultCode".to_string(), result.code.clone());
        fields.insert("resultDesc".to_string(), result.description.clone());
        state.writes += 1;
        Ok(Transition::Applied)
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.users.get(user_id).map(|f| User {
            fcm_token: f.get("fcmToken").cloned(),
        }))
    }
}

/// Records every message instead of delivering it.
#[derive(Debug, Clone, Default)]
pub struct RecordingPushSender {
    sent: Arc<Mutex<Vec<PushMessage>>>,
    fail: bool,
}

impl RecordingPushSender {
    /// Every send is rejected, as FCM does for an unregistered token.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<PushMessage> {
        self.sent.lock().unwrap().clone()
    }
}

impl PushSender for RecordingPushSender {
    async fn send(&self, message: &PushMessage) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::Rejected {
                status: StatusCode::NOT_FOUND,
                body: "UNREGISTERED".to_string(),
            });
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}
