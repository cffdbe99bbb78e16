//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables
//! into a type-safe struct.
//!
//! The single-tenant specifics (user id, seed balance, default notification
//! channel) are explicit configuration values rather than constants buried in
//! the code, so the defaults are visible and overridable per deployment.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::preferences::NotificationChannel;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `DEFAULT_USER_ID` (optional): id of the single tenant, defaults to `user_default`
/// - `INITIAL_BALANCE` (optional): balance seeded on first lookup, defaults to 500000
/// - `DEFAULT_NOTIFICATION_CHANNEL` (optional): channel used when no preference
///   record exists, `email` or `sms`, defaults to `email`
/// - `NOTIFY_GATEWAY_URL` (optional): delivery gateway endpoint; when unset the
///   dispatcher runs in log-only mode
/// - `NOTIFY_GATEWAY_SECRET` (optional): HMAC key for signing gateway payloads
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_user_id")]
    pub default_user_id: String,

    #[serde(default = "default_initial_balance")]
    pub initial_balance: Decimal,

    #[serde(default = "default_notification_channel")]
    pub default_notification_channel: String,

    #[serde(default)]
    pub notify_gateway_url: Option<String>,

    #[serde(default)]
    pub notify_gateway_secret: Option<String>,
}

fn default_port() -> u16 {
    3000
}

fn default_user_id() -> String {
    "user_default".to_string()
}

fn default_initial_balance() -> Decimal {
    Decimal::new(500_000, 0)
}

fn default_notification_channel() -> String {
    "email".to_string()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Attempts to load a `.env` file first (optional), then deserializes the
    /// environment into a `Config`. Field names map to upper-cased variable
    /// names (`database_url` -> `DATABASE_URL`).
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>()
    }

    /// Channel used when the user has no stored preference.
    ///
    /// The raw string is validated at startup, so an invalid value can only
    /// appear here if the process was started without calling
    /// [`Config::validate`]; in that case email wins.
    pub fn default_channel(&self) -> NotificationChannel {
        NotificationChannel::parse(&self.default_notification_channel)
            .unwrap_or(NotificationChannel::Email)
    }

    /// Reject configurations that would only fail at request time.
    pub fn validate(&self) -> anyhow::Result<()> {
        if NotificationChannel::parse(&self.default_notification_channel).is_none() {
            anyhow::bail!(
                "DEFAULT_NOTIFICATION_CHANNEL must be \"email\" or \"sms\", got {:?}",
                self.default_notification_channel
            );
        }
        if self.initial_balance < Decimal::ZERO {
            anyhow::bail!("INITIAL_BALANCE must not be negative");
        }
        if let Some(url) = &self.notify_gateway_url {
            crate::services::notification::validate_gateway_url(url)?;
        }
        Ok(())
    }
}
