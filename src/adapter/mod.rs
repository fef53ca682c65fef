pub mod fcm;
pub mod google_auth;
pub mod redis;
