use std::{env, path::PathBuf, time::Duration};

use crate::services::reminder_service::MissedReminderPolicy;

pub const DEFAULT_CART_KEY: &str = "cart";
pub const DEFAULT_TIMESTAMP_KEY: &str = "cartTimestamp";
pub const DEFAULT_REMINDED_KEY: &str = "cartReminded";
pub const DEFAULT_REMINDER_SECS: u64 = 2 * 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store_dir: PathBuf,
    pub cart: CartConfig,
    pub notifications: bool,
}

/// Settings owned by the cart manager and its reminder scheduler.
#[derive(Debug, Clone)]
pub struct CartConfig {
    pub cart_key: String,
    pub timestamp_key: String,
    pub reminded_key: String,
    pub reminder_interval: Duration,
    pub missed_reminder: MissedReminderPolicy,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            cart_key: DEFAULT_CART_KEY.to_string(),
            timestamp_key: DEFAULT_TIMESTAMP_KEY.to_string(),
            reminded_key: DEFAULT_REMINDED_KEY.to_string(),
            reminder_interval: Duration::from_secs(DEFAULT_REMINDER_SECS),
            missed_reminder: MissedReminderPolicy::Fire,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let store_dir = env::var("CART_STORE_DIR").unwrap_or_else(|_| ".arturo".to_string());
        let cart_key = env::var("CART_KEY").unwrap_or_else(|_| DEFAULT_CART_KEY.to_string());
        let timestamp_key =
            env::var("CART_TIMESTAMP_KEY").unwrap_or_else(|_| DEFAULT_TIMESTAMP_KEY.to_string());
        let reminded_key =
            env::var("CART_REMINDED_KEY").unwrap_or_else(|_| DEFAULT_REMINDED_KEY.to_string());
        let reminder_secs = env::var("CART_REMINDER_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_REMINDER_SECS);
        let missed_reminder = match env::var("CART_MISSED_REMINDER") {
            Ok(value) => value.parse::<MissedReminderPolicy>()?,
            Err(_) => MissedReminderPolicy::Fire,
        };
        let notifications = env::var("CART_NOTIFICATIONS")
            .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "off" | "false" | "0"))
            .unwrap_or(true);

        if cart_key == timestamp_key || cart_key == reminded_key || timestamp_key == reminded_key {
            anyhow::bail!("CART_KEY, CART_TIMESTAMP_KEY and CART_REMINDED_KEY must differ");
        }

        Ok(Self {
            store_dir: PathBuf::from(store_dir),
            cart: CartConfig {
                cart_key,
                timestamp_key,
                reminded_key,
                reminder_interval: Duration::from_secs(reminder_secs),
                missed_reminder,
            },
            notifications,
        })
    }
}
