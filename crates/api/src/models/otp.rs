//! One-time code record.

use chrono::{DateTime, Utc};

use bazaar_core::{OneTimeCode, OtpCodeId};

/// A stored one-time login code.
///
/// Lifecycle: created on request, marked used on first successful
/// verification, purged by the expiry sweep that runs before each new
/// issuance. A used or expired code never verifies again.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OtpCode {
    /// Unique row ID.
    pub id: OtpCodeId,
    /// Email the code was issued to.
    pub email: String,
    /// The six-digit code.
    pub code: OneTimeCode,
    /// Hard expiry; five minutes after issuance.
    pub expires_at: DateTime<Utc>,
    /// Set on first successful verification.
    pub used: bool,
    /// When the code was issued.
    pub created_at: DateTime<Utc>,
}

impl OtpCode {
    /// Whether this code can still be consumed at `now`.
    #[must_use]
    pub fn is_verifiable(&self, now: DateTime<Utc>) -> bool {
        !self.used && self.expires_at > now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn code(used: bool, expires_in: Duration) -> OtpCode {
        let now = Utc::now();
        OtpCode {
            id: OtpCodeId::new(1),
            email: "user@example.com".to_owned(),
            code: OneTimeCode::parse("123456").expect("six digits"),
            expires_at: now + expires_in,
            used,
            created_at: now,
        }
    }

    #[test]
    fn test_fresh_code_is_verifiable() {
        assert!(code(false, Duration::minutes(5)).is_verifiable(Utc::now()));
    }

    #[test]
    fn test_used_code_never_verifies() {
        assert!(!code(true, Duration::minutes(5)).is_verifiable(Utc::now()));
    }

    #[test]
    fn test_expired_code_never_verifies() {
        assert!(!code(false, Duration::minutes(-1)).is_verifiable(Utc::now()));
    }
}
