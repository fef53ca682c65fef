use std::time::Duration;

use anyhow::{Context, Result};
use booking_callback_svc::adapter::google_auth::{AccessTokenProvider, ServiceAccountKey, FCM_SCOPE};
use booking_callback_svc::app::AppEnv;
use booking_callback_svc::services::callback_processor::CallbackProcessor;
use booking_callback_svc::services::fcm_push_sender::FcmPushSender;
use booking_callback_svc::services::redis_booking_store::RedisBookingStore;
use booking_callback_svc::{adapter, config, http::router};
use tokio::signal;
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_span_events(FmtSpan::CLOSE))
        .init();
    config::load_dotenv();
    let cnf = config::init()?;

    let redis_conn = adapter::redis::create_redis_connection(&cnf.redis_url).await?;
    let store = RedisBookingStore::new(redis_conn, &cnf.booking_key_prefix, &cnf.user_key_prefix);

    let fcm_client = adapter::fcm::create_fcm_client(Duration::from_secs(cnf.fcm_timeout_secs))
        .context("failed to build fcm client")?;
    let key = ServiceAccountKey::from_file(&cnf.fcm_credentials_file)?;
    let project_id = cnf
        .fcm_project_id
        .clone()
        .or_else(|| key.project_id.clone())
        .context("FCM_PROJECT_ID unset and service account key has no project_id")?;
    let tokens = AccessTokenProvider::new(fcm_client.clone(), &key, FCM_SCOPE)?;
    let sender = FcmPushSender::new(fcm_client, &cnf.fcm_base_url, &project_id, tokens)
        .context("invalid fcm settings")?;
    tracing::info!("sending pushes for project {project_id} as {}", key.client_email);

    let app = AppEnv::new(CallbackProcessor::new(store, sender));
    let router = router::new(app);

    tracing::info!("starting axum server");
    let socket_addr = format!("{}:{}", cnf.app_host, cnf.app_port);
    let sock = tokio::net::TcpSocket::new_v4()?;
    sock.set_reuseport(true)?;
    sock.bind(socket_addr.parse()?)?;
    let listener = sock.listen(1024)?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("axum server failed")?;
    tracing::info!("process terminated");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install C-c handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    let sigterm = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install sigterm handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => {
        tracing::info!("ctrl-c hit, graceful shutdown...")
        },
        _ = sigterm => {
        tracing::info!("SIGTERM received, graceful shutdown...")
        },
    };
}
