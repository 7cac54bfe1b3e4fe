//! Configuration loaded from environment variables with sensible defaults.

use chrono::Duration;
use rust_decimal::Decimal;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_ADMIN_SECRET: &str = "admin123";
pub const DEFAULT_SESSION_HOURS: i64 = 8;
pub const MAX_SESSION_HOURS: i64 = 24 * 365;
pub const DEFAULT_MEDIA_MAX_BYTES: usize = 5 * 1024 * 1024;
pub const DEFAULT_PROMO_MEDIA: &str = "/media/promo.gif";

#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Path to the redb file backing the key-value store
    pub db_path: PathBuf,
    /// Shared admin secret. Not a production credential scheme.
    pub admin_secret: String,
    /// How long an admin login stays valid
    pub session_hours: i64,
    /// Largest accepted promotional media upload
    pub media_max_bytes: usize,
    /// Media shown when no custom override is stored
    pub default_promo_media: String,
    /// Flat shipping fee added at checkout
    pub shipping_fee: Decimal,
    /// Log filter used when RUST_LOG is unset
    pub log_level: String,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./data/storefront.redb"),
            admin_secret: DEFAULT_ADMIN_SECRET.to_string(),
            session_hours: DEFAULT_SESSION_HOURS,
            media_max_bytes: DEFAULT_MEDIA_MAX_BYTES,
            default_promo_media: DEFAULT_PROMO_MEDIA.to_string(),
            shipping_fee: Decimal::ZERO,
            log_level: "info".to_string(),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from the environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let session_hours = parse_var("STOREFRONT_SESSION_HOURS")?.unwrap_or(defaults.session_hours);
        if !(1..=MAX_SESSION_HOURS).contains(&session_hours) {
            return Err(ConfigError::Invalid { key: "STOREFRONT_SESSION_HOURS", value: session_hours.to_string() });
        }

        Ok(Self {
            db_path: env::var("STOREFRONT_DB_PATH").map(PathBuf::from).unwrap_or(defaults.db_path),
            admin_secret: env::var("STOREFRONT_ADMIN_SECRET").unwrap_or(defaults.admin_secret),
            session_hours,
            media_max_bytes: parse_var("STOREFRONT_MEDIA_MAX_BYTES")?.unwrap_or(defaults.media_max_bytes),
            default_promo_media: env::var("STOREFRONT_DEFAULT_PROMO_MEDIA").unwrap_or(defaults.default_promo_media),
            shipping_fee: parse_var("STOREFRONT_SHIPPING_FEE")?.unwrap_or(defaults.shipping_fee),
            log_level: env::var("STOREFRONT_LOG_LEVEL").unwrap_or(defaults.log_level),
        })
    }

    /// Admin session lifetime, clamped to between one hour and `MAX_SESSION_HOURS`.
    pub fn session_lifetime(&self) -> Duration {
        Duration::hours(self.session_hours.clamp(1, MAX_SESSION_HOURS))
    }
}

fn parse_var<T: FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(None),
    }
}
