use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store_url: String,
    pub store_api_key: String,
    pub staff_jwt_secret: String,
    pub order_token_secret: String,
    /// Offset from UTC of the business wall clock, in minutes.
    pub business_utc_offset_minutes: i32,
    /// Inactivity budget for virtual-inspection queue entries, in minutes.
    pub queue_inactivity_minutes: i64,
    pub queue_sweep_interval_seconds: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            store_url: env::var("STORE_URL").unwrap_or_else(|_| {
                warn!("STORE_URL not set, using empty value");
                String::new()
            }),
            store_api_key: env::var("STORE_API_KEY").unwrap_or_else(|_| {
                warn!("STORE_API_KEY not set, using empty value");
                String::new()
            }),
            staff_jwt_secret: env::var("STAFF_JWT_SECRET").unwrap_or_else(|_| {
                warn!("STAFF_JWT_SECRET not set, using empty value");
                String::new()
            }),
            order_token_secret: env::var("ORDER_TOKEN_SECRET").unwrap_or_else(|_| {
                warn!("ORDER_TOKEN_SECRET not set, using empty value");
                String::new()
            }),
            business_utc_offset_minutes: env::var("BUSINESS_UTC_OFFSET_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            queue_inactivity_minutes: env::var("QUEUE_INACTIVITY_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            queue_sweep_interval_seconds: env::var("QUEUE_SWEEP_INTERVAL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.store_url.is_empty()
            && !self.store_api_key.is_empty()
            && !self.staff_jwt_secret.is_empty()
            && !self.order_token_secret.is_empty()
    }
}
