//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::{Email, Role, UserId};

/// A Bazaar account.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address (unique).
    pub email: Email,
    /// Account role. Role transitions are reserved to super admins.
    pub role: Role,
    /// Whether the email has been verified via OTP.
    pub email_verified: bool,
    /// Accounts with `deletable = false` can never be deleted, by anyone.
    pub deletable: bool,
    /// Admin account that created this one, if any.
    pub created_by: Option<UserId>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}
