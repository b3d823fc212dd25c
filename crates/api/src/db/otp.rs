//! One-time code repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use bazaar_core::{OneTimeCode, OtpCodeId};

use super::RepositoryError;
use crate::models::OtpCode;

const OTP_COLUMNS: &str = "id, email, code, expires_at, used, created_at";

/// Repository for one-time code database operations.
pub struct OtpRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OtpRepository<'a> {
    /// Create a new OTP repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Delete every expired code, for all emails.
    ///
    /// Runs before each new issuance. It is fine for two concurrent
    /// issuances to race here; the sweep is housekeeping, not correctness.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM otp_codes WHERE expires_at < $1")
            .bind(now)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Store a freshly issued code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        &self,
        email: &str,
        code: &OneTimeCode,
        expires_at: DateTime<Utc>,
    ) -> Result<OtpCode, RepositoryError> {
        let otp = sqlx::query_as::<_, OtpCode>(&format!(
            "INSERT INTO otp_codes (email, code, expires_at) VALUES ($1, $2, $3) \
             RETURNING {OTP_COLUMNS}"
        ))
        .bind(email)
        .bind(code)
        .bind(expires_at)
        .fetch_one(self.pool)
        .await?;

        Ok(otp)
    }

    /// Find the most recent unused, unexpired code matching email and code
    /// exactly. Returns `None` on any mismatch; no reason is surfaced.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_verifiable(
        &self,
        email: &str,
        code: &OneTimeCode,
        now: DateTime<Utc>,
    ) -> Result<Option<OtpCode>, RepositoryError> {
        let otp = sqlx::query_as::<_, OtpCode>(&format!(
            "SELECT {OTP_COLUMNS} FROM otp_codes \
             WHERE email = $1 AND code = $2 AND NOT used AND expires_at > $3 \
             ORDER BY created_at DESC \
             LIMIT 1"
        ))
        .bind(email)
        .bind(code)
        .bind(now)
        .fetch_optional(self.pool)
        .await?;

        Ok(otp)
    }

    /// Consume a code. The `NOT used` guard makes the consume itself
    /// single-use even if two verifications race on the same row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the code was already consumed.
    pub async fn mark_used(&self, id: OtpCodeId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE otp_codes SET used = TRUE WHERE id = $1 AND NOT used")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
