//! Notification preference model and channel type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Delivery channel for operation notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationChannel {
    Email,
    Sms,
}

impl NotificationChannel {
    /// Parse the stored/requested form. Anything but "email" or "sms" is
    /// rejected by returning `None`; the caller decides how to surface it.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "email" => Some(NotificationChannel::Email),
            "sms" => Some(NotificationChannel::Sms),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NotificationChannel::Email => "email",
            NotificationChannel::Sms => "sms",
        }
    }

    pub fn email_enabled(self) -> bool {
        matches!(self, NotificationChannel::Email)
    }

    pub fn sms_enabled(self) -> bool {
        matches!(self, NotificationChannel::Sms)
    }
}

/// Stored notification preference of a user.
///
/// # Database Table
///
/// Maps to the `user_notifications` table. The row only exists once the
/// user has set a preference explicitly; until then lookups answer with
/// the configured default channel. The enabled flags are derived from the
/// channel and kept in lockstep with it on every write.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct NotificationPreferences {
    pub user_id: String,

    /// "email" or "sms"
    pub channel: String,

    pub email_enabled: bool,
    pub sms_enabled: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NotificationPreferences {
    /// The typed channel; a row can only hold a value that passed
    /// validation, so an unparseable one falls back to email.
    pub fn channel(&self) -> NotificationChannel {
        NotificationChannel::parse(&self.channel).unwrap_or(NotificationChannel::Email)
    }
}

/// Request body for `PUT /api/user/notifications`.
///
/// ```json
/// { "channel": "sms" }
/// ```
#[derive(Debug, Deserialize)]
pub struct UpdatePreferencesRequest {
    pub channel: String,
}

/// Response body for the preference endpoints.
///
/// `updated_at` is absent when the user never stored a preference and the
/// answer is the configured default.
#[derive(Debug, Serialize)]
pub struct PreferencesResponse {
    pub channel: String,
    pub email_enabled: bool,
    pub sms_enabled: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl PreferencesResponse {
    /// Shape the default answer for a user without a stored preference.
    pub fn default_for(channel: NotificationChannel) -> Self {
        Self {
            channel: channel.as_str().to_string(),
            email_enabled: channel.email_enabled(),
            sms_enabled: channel.sms_enabled(),
            updated_at: None,
        }
    }
}

impl From<NotificationPreferences> for PreferencesResponse {
    fn from(preferences: NotificationPreferences) -> Self {
        Self {
            channel: preferences.channel,
            email_enabled: preferences.email_enabled,
            sms_enabled: preferences.sms_enabled,
            updated_at: Some(preferences.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_two_supported_channels() {
        assert_eq!(
            NotificationChannel::parse("email"),
            Some(NotificationChannel::Email)
        );
        assert_eq!(
            NotificationChannel::parse("sms"),
            Some(NotificationChannel::Sms)
        );
    }

    #[test]
    fn rejects_anything_else() {
        assert_eq!(NotificationChannel::parse("pigeon"), None);
        assert_eq!(NotificationChannel::parse("EMAIL"), None);
        assert_eq!(NotificationChannel::parse(""), None);
    }

    #[test]
    fn enabled_flags_follow_the_channel() {
        assert!(NotificationChannel::Email.email_enabled());
        assert!(!NotificationChannel::Email.sms_enabled());
        assert!(NotificationChannel::Sms.sms_enabled());
        assert!(!NotificationChannel::Sms.email_enabled());
    }

    #[test]
    fn default_response_derives_flags_from_the_channel() {
        let response = PreferencesResponse::default_for(NotificationChannel::Sms);
        assert_eq!(response.channel, "sms");
        assert!(response.sms_enabled);
        assert!(!response.email_enabled);
        assert!(response.updated_at.is_none());
    }
}
