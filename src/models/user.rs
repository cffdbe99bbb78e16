//! Single-tenant user model.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// The system's single user.
///
/// # Database Table
///
/// Maps to the `users` table. Exactly one row exists, seeded at startup
/// with the id from `DEFAULT_USER_ID`; identity fields are immutable
/// afterwards. Email and phone are the notification recipients for the
/// two supported channels.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct User {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub document_number: String,
    /// Identity document type (CC, TI, CE, ...)
    pub document_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
