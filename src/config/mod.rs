use anyhow::{anyhow, Context, Result};
use once_cell::sync::OnceCell;
use serde::Deserialize;
use serde_inline_default::serde_inline_default;

#[serde_inline_default]
#[derive(Deserialize, Debug)]
pub struct Config {
    #[serde_inline_default("127.0.0.1".to_string())]
    pub app_host: String,
    #[serde_inline_default(8080)]
    pub app_port: u16,
    pub redis_url: String,
    #[serde_inline_default("bookings".to_string())]
    pub booking_key_prefix: String,
    #[serde_inline_default("users".to_string())]
    pub user_key_prefix: String,
    /// Falls back to the `project_id` in the service-account key.
    pub fcm_project_id: Option<String>,
    /// Path of the downloaded service-account JSON key used to mint tokens.
    pub fcm_credentials_file: String,
    #[serde_inline_default("https://fcm.googleapis.com".to_string())]
    pub fcm_base_url: String,
    #[serde_inline_default(10)]
    pub fcm_timeout_secs: u64,
}

static CONFIG: OnceCell<Config> = OnceCell::new();

fn load_config() -> Result<Config> {
    envy::from_env::<Config>()
        .map_err(|e| anyhow!(e))
        .context(format!(
            "at {} line {} column {}",
            file!(),
            line!(),
            column!(),
        ))
}

/// Loads `.env` into the process environment if there is one. Call after
/// the subscriber is installed so the outcome is logged.
pub fn load_dotenv() {
    // the real environment wins either way
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("loaded {}", path.display()),
        Err(e) => tracing::debug!("no .env loaded: {e}"),
    }
}

/// Loads the config on first call and hands out the same instance afterwards.
pub fn init() -> Result<&'static Config> {
    CONFIG.get_or_try_init(load_config)
}
