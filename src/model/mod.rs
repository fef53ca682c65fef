use std::fmt;

pub mod callback;
pub mod error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Failed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The slice of a booking record this service touches. The record itself is
/// owned by the booking-creation flow, so `status` is kept as the raw stored
/// value rather than narrowed to [`BookingStatus`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub status: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub fcm_token: Option<String>,
}

impl User {
    /// Registered push destination, if any. An empty token counts as none.
    pub fn notification_token(&self) -> Option<&str> {
        self.fcm_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Provider result recorded next to the status change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentResult {
    pub code: String,
    pub description: String,
}

/// Result of a conditional status write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Applied,
    /// The booking was no longer in the expected state; nothing was written.
    Rejected { current: Option<String> },
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushMessage {
    pub token: String,
    pub title: String,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_token_is_no_destination() {
        let mut user = User {
            fcm_token: Some(String::new()),
        };
        assert_eq!(user.notification_token(), None);

        user.fcm_token = None;
        assert_eq!(user.notification_token(), None);

        user.fcm_token = Some("tok-1".to_string());
        assert_eq!(user.notification_token(), Some("tok-1"));
    }

    #[test]
    fn status_renders_as_stored_value() {
        assert_eq!(BookingStatus::Pending.to_string(), "pending");
        assert_eq!(BookingStatus::Confirmed.as_str(), "confirmed");
        assert_eq!(BookingStatus::Failed.as_str(), "failed");
    }
}
