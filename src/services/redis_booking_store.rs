use std::collections::HashMap;

use chrono::{SecondsFormat, Utc};
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Script};

use crate::adapter::redis::{record_key, transition_script};
use crate::model::error::StoreError;
use crate::model::{Booking, BookingStatus, PaymentResult, Transition, User};

use super::i_booking_store::BookingStore;

const STATUS_FIELD: &str = "status";
const USER_ID_FIELD: &str = "userId";
const FCM_TOKEN_FIELD: &str = "fcmToken";

/// Bookings and users stored as Redis hashes under `{prefix}:{id}`.
#[derive(Debug, Clone)]
pub struct RedisBookingStore {
    redis_conn: MultiplexedConnection,
    booking_prefix: String,
    user_prefix: String,
    transition: Script,
}

impl RedisBookingStore {
    pub fn new(redis_conn: MultiplexedConnection, booking_prefix: &str, user_prefix: &str) -> Self {
        Self {
            redis_conn,
            booking_prefix: booking_prefix.to_owned(),
            user_prefix: user_prefix.to_owned(),
            transition: transition_script(),
        }
    }

    async fn load_hash(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        let mut redis_conn = self.redis_conn.clone();
        let fields: HashMap<String, String> = redis_conn.hgetall(key).await?;
        Ok(fields)
    }
}

impl BookingStore for RedisBookingStore {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn get_booking(&self, booking_id: &str) -> Result<Option<Booking>, StoreError> {
        let mut fields = self
            .load_hash(&record_key(&self.booking_prefix, booking_id))
            .await?;
        // HGETALL answers an empty map for a missing key
        if fields.is_empty() {
            return Ok(None);
        }
        Ok(Some(Booking {
            status: fields.remove(STATUS_FIELD),
            user_id: fields.remove(USER_ID_FIELD),
        }))
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn transition_booking(
        &self,
        booking_id: &str,
        from: BookingStatus,
        to: BookingStatus,
        result: &PaymentResult,
    ) -> Result<Transition, StoreError> {
        let mut redis_conn = self.redis_conn.clone();
        let updated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let reply: (i64, String) = self
            .transition
            .key(record_key(&self.booking_prefix, booking_id))
            .arg(from.as_str())
            .arg(to.as_str())
            .arg(updated_at)
            .arg(&result.code)
            .arg(&result.description)
            .invoke_async(&mut redis_conn)
            .await?;
        tracing::debug!("transition script replied {reply:?}");
        transition_from_reply(reply)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        let mut fields = self
            .load_hash(&record_key(&self.user_prefix, user_id))
            .await?;
        if fields.is_empty() {
            return Ok(None);
        }
        Ok(Some(User {
            fcm_token: fields.remove(FCM_TOKEN_FIELD),
        }))
    }
}

fn transition_from_reply((code, status): (i64, String)) -> Result<Transition, StoreError> {
    match code {
        1 => Ok(Transition::Applied),
        0 => Ok(Transition::Rejected {
            current: Some(status).filter(|s| !s.is_empty()),
        }),
        -1 => Ok(Transition::Missing),
        other => Err(StoreError::UnexpectedReply(other)),
    }
}
