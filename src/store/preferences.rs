//! Notification preference access.
//!
//! Reads never create the row; an absent record means "use the configured
//! default channel". Only an explicit preference update writes here.

use crate::{
    db::DbPool,
    error::AppError,
    models::preferences::{NotificationChannel, NotificationPreferences},
};

/// Fetch the stored preference, if the user ever set one.
pub async fn get(pool: &DbPool, user_id: &str) -> Result<Option<NotificationPreferences>, AppError> {
    let preferences = sqlx::query_as::<_, NotificationPreferences>(
        "SELECT user_id, channel, email_enabled, sms_enabled, created_at, updated_at
         FROM user_notifications WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(preferences)
}

/// Store the preferred channel, deriving the enabled flags from it.
///
/// Idempotent: setting the channel it already has just bumps `updated_at`.
pub async fn upsert(
    pool: &DbPool,
    user_id: &str,
    channel: NotificationChannel,
) -> Result<NotificationPreferences, AppError> {
    let preferences = sqlx::query_as::<_, NotificationPreferences>(
        "INSERT INTO user_notifications (user_id, channel, email_enabled, sms_enabled)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (user_id) DO UPDATE
         SET channel = EXCLUDED.channel,
             email_enabled = EXCLUDED.email_enabled,
             sms_enabled = EXCLUDED.sms_enabled,
             updated_at = NOW()
         RETURNING user_id, channel, email_enabled, sms_enabled, created_at, updated_at",
    )
    .bind(user_id)
    .bind(channel.as_str())
    .bind(channel.email_enabled())
    .bind(channel.sms_enabled())
    .fetch_one(pool)
    .await?;

    Ok(preferences)
}
