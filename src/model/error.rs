use axum::response::{IntoResponse, Response};
use http::StatusCode;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum AppError {
    #[error("invalid callback data: {0}")]
    InvalidCallback(#[from] CallbackError),
    #[error("booking {0} not found")]
    BookingNotFound(String),
    #[error("booking store failure: {0}")]
    Store(#[from] StoreError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidCallback(_) => StatusCode::BAD_REQUEST,
            AppError::BookingNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // the provider only sees a short text body; details stay in the logs
        let body = match self {
            AppError::InvalidCallback(_) => "Invalid callback data",
            AppError::BookingNotFound(_) => "Booking not found",
            AppError::Store(_) => "Internal error",
        };
        (self.status_code(), body).into_response()
    }
}

#[derive(ThisError, Debug)]
pub enum CallbackError {
    #[error("malformed callback body: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("callback has no Body.stkCallback")]
    MissingCallback,
    #[error("callback has no CallbackMetadata")]
    MissingMetadata,
}

#[derive(ThisError, Debug)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("unexpected reply from transition script: {0}")]
    UnexpectedReply(i64),
}

#[derive(ThisError, Debug)]
pub enum NotifyError {
    #[error("push request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("push service rejected message with {status}: {body}")]
    Rejected { status: StatusCode, body: String },
    #[error("failed to sign access token assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
    #[error("failed to encode access token request: {0}")]
    Encoding(#[from] serde_urlencoded::ser::Error),
    #[error("token endpoint refused credentials with {status}: {body}")]
    TokenRejected { status: StatusCode, body: String },
    #[error("failed to resolve notification token: {0}")]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_errors_to_status_codes() {
        assert_eq!(
            AppError::from(CallbackError::MissingMetadata).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::BookingNotFound("B1".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(StoreError::UnexpectedReply(7)).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
