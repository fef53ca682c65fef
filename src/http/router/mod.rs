use crate::app::AppEnv;
use crate::services::i_booking_store::BookingStore;
use crate::services::i_push_sender::PushSender;
use std::sync::Arc;

use axum::routing::post;
use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

mod mpesa;

pub fn new<Store, Sender>(app: AppEnv<Store, Sender>) -> Router
where
    Store: BookingStore,
    Sender: PushSender,
{
    let app_state = Arc::new(app);
    Router::new()
        .route("/", get(|| async { "OK" }))
        .route(
            "/mpesa-callback/:booking_id",
            post(mpesa::mpesa_callback_handler::<Store, Sender>),
        )
        .with_state(app_state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
