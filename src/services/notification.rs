//! Notification dispatcher and preference management.
//!
//! The dispatcher decides the channel from the user's stored preference
//! (falling back to the configured default), builds a channel-specific
//! message and hands it to an external delivery gateway over HTTP. Delivery
//! is best-effort: any failure is logged and reported as a `false` outcome,
//! never propagated into the fund operation that triggered it.
//!
//! Without a configured gateway the dispatcher runs in log-only mode and
//! writes the message to the log instead, which is the development setup.

use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use serde_json::json;
use sha2::Sha256;
use uuid::Uuid;

use crate::config::Config;
use crate::db::DbPool;
use crate::error::AppError;
use crate::models::balance::format_cop;
use crate::models::preferences::{
    NotificationChannel, NotificationPreferences, PreferencesResponse,
};
use crate::models::transaction::TransactionType;
use crate::models::user::User;
use crate::services::validation;
use crate::store;

type HmacSha256 = Hmac<Sha256>;

/// SMS bodies are capped at a single segment.
const SMS_MAX_CHARS: usize = 160;

/// A rendered notification: SMS messages carry no subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub subject: Option<String>,
    pub body: String,
}

/// Pick the channel to use: the stored preference wins, the configured
/// default covers users who never set one.
pub fn resolve_channel(
    preferences: Option<&NotificationPreferences>,
    default: NotificationChannel,
) -> NotificationChannel {
    preferences.map(NotificationPreferences::channel).unwrap_or(default)
}

/// Build the channel-specific message for a completed operation.
///
/// Email gets a subject and a multi-line body with the transaction
/// details; SMS gets one line that fits in a single segment.
pub fn build_message(
    channel: NotificationChannel,
    user_name: &str,
    transaction_type: TransactionType,
    transaction_id: Uuid,
    fund_name: &str,
    amount: Decimal,
    resulting_balance: Decimal,
) -> Message {
    match channel {
        NotificationChannel::Email => Message {
            subject: Some(format!(
                "{} confirmation - {}",
                transaction_type.display(),
                fund_name
            )),
            body: format!(
                "Dear {user_name},\n\n\
                 Your {} has been processed successfully.\n\n\
                 TRANSACTION DETAILS:\n\
                 - Id: {transaction_id}\n\
                 - Fund: {fund_name}\n\
                 - Amount: {}\n\
                 - Available balance: {}\n\n\
                 This is an automated message, please do not reply.",
                transaction_type.display().to_lowercase(),
                format_cop(amount),
                format_cop(resulting_balance),
            ),
        },
        NotificationChannel::Sms => {
            let short_id: String = transaction_id.to_string().chars().take(8).collect();
            let body = format!(
                "Hello {user_name}! Your {} of {} for {fund_name} was processed. Id: {short_id}",
                transaction_type.display().to_lowercase(),
                format_cop(amount),
            );
            Message {
                subject: None,
                body: truncate_chars(&body, SMS_MAX_CHARS),
            }
        }
    }
}

/// Hand the message to the delivery gateway. Returns whether it was
/// accepted; all failure paths log and answer `false`.
pub async fn dispatch(
    config: &Config,
    user: &User,
    channel: NotificationChannel,
    message: &Message,
    transaction_id: Uuid,
) -> bool {
    let recipient = match channel {
        NotificationChannel::Email => user.email.as_str(),
        NotificationChannel::Sms => user.phone.as_str(),
    };

    let Some(gateway_url) = &config.notify_gateway_url else {
        // Log-only mode: the message is the delivery.
        tracing::info!(
            channel = channel.as_str(),
            recipient,
            %transaction_id,
            "notification (log-only): {}",
            message.body
        );
        return true;
    };

    let event_id = Uuid::new_v4();
    let payload = json!({
        "event_id": event_id,
        "transaction_id": transaction_id,
        "channel": channel.as_str(),
        "recipient": recipient,
        "subject": message.subject,
        "body": message.body,
    });
    let payload_json = match serde_json::to_string(&payload) {
        Ok(body) => body,
        Err(err) => {
            tracing::error!("failed to serialize notification payload: {err}");
            return false;
        }
    };

    let client = match reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
    {
        Ok(client) => client,
        Err(err) => {
            tracing::error!("failed to build notification client: {err}");
            return false;
        }
    };

    let mut request = client
        .post(gateway_url)
        .header("Content-Type", "application/json")
        .header("X-Notification-Event-Id", event_id.to_string());
    if let Some(secret) = &config.notify_gateway_secret {
        request = request.header(
            "X-Notification-Signature",
            sign_payload(secret, &payload_json),
        );
    }

    match request.body(payload_json).send().await {
        Ok(response) if response.status().is_success() => {
            tracing::info!(
                channel = channel.as_str(),
                recipient,
                %transaction_id,
                "notification accepted by gateway"
            );
            true
        }
        Ok(response) => {
            tracing::error!(
                channel = channel.as_str(),
                status = %response.status(),
                %transaction_id,
                "notification rejected by gateway"
            );
            false
        }
        Err(err) => {
            tracing::error!(
                channel = channel.as_str(),
                %transaction_id,
                "notification delivery failed: {err}"
            );
            false
        }
    }
}

/// Current preferences, or the configured default when none are stored.
pub async fn get_preferences(
    pool: &DbPool,
    config: &Config,
) -> Result<PreferencesResponse, AppError> {
    let stored = store::preferences::get(pool, &config.default_user_id).await?;

    Ok(match stored {
        Some(preferences) => preferences.into(),
        None => PreferencesResponse::default_for(config.default_channel()),
    })
}

/// Validate and store a new preferred channel.
///
/// An invalid channel is rejected before any write, so the prior
/// preference stays untouched.
pub async fn update_preferences(
    pool: &DbPool,
    config: &Config,
    requested_channel: &str,
) -> Result<PreferencesResponse, AppError> {
    let channel = validation::validate_channel(requested_channel)?;
    let preferences = store::preferences::upsert(pool, &config.default_user_id, channel).await?;

    tracing::info!(channel = channel.as_str(), "notification preference updated");
    Ok(preferences.into())
}

/// HMAC-SHA256 signature over the payload, `sha256=<hex>`.
///
/// The gateway verifies it with the shared secret before trusting the
/// message.
fn sign_payload(secret: &str, payload: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC key length is valid");
    mac.update(payload.as_bytes());
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

/// Validate the delivery gateway URL at startup.
///
/// HTTPS required; plain HTTP is allowed for localhost so a local stub
/// gateway works during development.
pub fn validate_gateway_url(raw: &str) -> anyhow::Result<()> {
    let parsed = url::Url::parse(raw)
        .map_err(|err| anyhow::anyhow!("NOTIFY_GATEWAY_URL is not a valid URL: {err}"))?;

    match parsed.scheme() {
        "https" => Ok(()),
        "http" => {
            if matches!(parsed.host_str(), Some("localhost" | "127.0.0.1" | "0.0.0.0")) {
                Ok(())
            } else {
                anyhow::bail!("NOTIFY_GATEWAY_URL must use HTTPS outside localhost")
            }
        }
        scheme => anyhow::bail!("NOTIFY_GATEWAY_URL has unsupported scheme {scheme:?}"),
    }
}

/// Cut at a char boundary; a multi-byte char never splits.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn preferences(channel: &str) -> NotificationPreferences {
        NotificationPreferences {
            user_id: "user_default".to_string(),
            channel: channel.to_string(),
            email_enabled: channel == "email",
            sms_enabled: channel == "sms",
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn stored_preference_wins_over_default() {
        let stored = preferences("sms");
        assert_eq!(
            resolve_channel(Some(&stored), NotificationChannel::Email),
            NotificationChannel::Sms
        );
    }

    #[test]
    fn missing_preference_falls_back_to_default() {
        assert_eq!(
            resolve_channel(None, NotificationChannel::Email),
            NotificationChannel::Email
        );
        assert_eq!(
            resolve_channel(None, NotificationChannel::Sms),
            NotificationChannel::Sms
        );
    }

    #[test]
    fn email_message_carries_subject_and_details() {
        let id = Uuid::new_v4();
        let message = build_message(
            NotificationChannel::Email,
            "Default Client",
            TransactionType::Subscription,
            id,
            "FDO-ACCIONES",
            dec!(250000),
            dec!(250000),
        );

        let subject = message.subject.expect("email has a subject");
        assert!(subject.contains("Subscription"));
        assert!(subject.contains("FDO-ACCIONES"));
        assert!(message.body.contains("COP $250,000.00"));
        assert!(message.body.contains(&id.to_string()));
    }

    #[test]
    fn sms_message_is_one_short_line() {
        let message = build_message(
            NotificationChannel::Sms,
            "Default Client",
            TransactionType::Cancellation,
            Uuid::new_v4(),
            "DEUDAPRIVADA",
            dec!(50000),
            dec!(500000),
        );

        assert!(message.subject.is_none());
        assert!(!message.body.contains('\n'));
        assert!(message.body.chars().count() <= SMS_MAX_CHARS);
        assert!(message.body.contains("cancellation"));
        assert!(message.body.contains("COP $50,000.00"));
    }

    #[test]
    fn signature_is_stable_for_same_input() {
        let first = sign_payload("secret", "payload");
        let second = sign_payload("secret", "payload");
        assert_eq!(first, second);
        assert!(first.starts_with("sha256="));
    }

    #[test]
    fn gateway_url_validation() {
        assert!(validate_gateway_url("https://notify.example.com/hook").is_ok());
        assert!(validate_gateway_url("http://localhost:9000/hook").is_ok());
        assert!(validate_gateway_url("http://notify.example.com/hook").is_err());
        assert!(validate_gateway_url("ftp://notify.example.com").is_err());
        assert!(validate_gateway_url("not a url").is_err());
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("áéíóú", 3), "áéí");
        assert_eq!(truncate_chars("short", 160), "short");
    }
}
