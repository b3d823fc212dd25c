//! One-time code issuance and verification.
//!
//! Codes are six digits, single-use, and expire five minutes after
//! issuance. Every issuance first sweeps expired rows so the table does
//! not grow without bound.

use bazaar_core::{Email, OneTimeCode};
use chrono::{Duration, Utc};
use sqlx::PgPool;
use thiserror::Error;

use crate::db::{RepositoryError, otp::OtpRepository, users::UserRepository};
use crate::models::User;
use crate::services::email::{EmailError, EmailService};

/// How long an issued code remains valid.
const CODE_TTL_MINUTES: i64 = 5;

/// Errors from the one-time code flow.
#[derive(Debug, Error)]
pub enum OtpError {
    /// Mail transport rejected the message.
    #[error(transparent)]
    Delivery(#[from] EmailError),

    /// Storage failure.
    #[error(transparent)]
    Persistence(#[from] crate::db::RepositoryError),
}

/// Outcome of a successful code verification.
#[derive(Debug)]
pub enum VerifyOutcome {
    /// The email maps to an existing account; the caller may log in.
    Loginable(User),
    /// No account exists yet; the caller must register.
    RequiresRegistration(Email),
    /// Code did not match, was expired, or was already used. The caller
    /// must surface a generic message without distinguishing the cause.
    Incorrect,
}

/// Issues and verifies one-time login codes.
pub struct OtpService<'a> {
    pool: &'a PgPool,
    email: &'a EmailService,
}

impl<'a> OtpService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, email: &'a EmailService) -> Self {
        Self { pool, email }
    }

    /// Issue a new code for `email` and dispatch it.
    ///
    /// Sweeps all expired codes first (system-wide, not per-email), then
    /// generates, persists, and mails a fresh code. Codes are issued for
    /// any well-formed address; whether an account exists is only
    /// revealed after verification.
    ///
    /// # Errors
    ///
    /// Returns [`OtpError::Persistence`] if storage fails and
    /// [`OtpError::Delivery`] if the mail transport rejects.
    pub async fn request_code(&self, email: &Email) -> Result<(), OtpError> {
        let repo = OtpRepository::new(self.pool);
        let now = Utc::now();

        let swept = repo.sweep_expired(now).await?;
        if swept > 0 {
            tracing::debug!(swept, "Purged expired one-time codes");
        }

        let code = generate_code();
        let expires_at = now + Duration::minutes(CODE_TTL_MINUTES);
        repo.insert(email.as_str(), &code, expires_at).await?;

        self.email
            .send_one_time_code(email.as_str(), code.as_str())
            .await?;

        tracing::info!(email = %email, "One-time code issued");
        Ok(())
    }

    /// Verify `code` for `email` and consume it on success.
    ///
    /// A used or expired code never verifies; a mismatch yields
    /// [`VerifyOutcome::Incorrect`] rather than an error so the handler
    /// can answer with a generic message.
    ///
    /// # Errors
    ///
    /// Returns [`OtpError::Persistence`] if storage fails.
    pub async fn verify_code(
        &self,
        email: &Email,
        code: &OneTimeCode,
    ) -> Result<VerifyOutcome, OtpError> {
        let repo = OtpRepository::new(self.pool);
        let now = Utc::now();

        let Some(otp) = repo.find_verifiable(email.as_str(), code, now).await? else {
            return Ok(VerifyOutcome::Incorrect);
        };

        // Consume before resolving the account; if two verifications race
        // on the same row, only one mark succeeds.
        if !consumed(repo.mark_used(otp.id).await)? {
            return Ok(VerifyOutcome::Incorrect);
        }

        let users = UserRepository::new(self.pool);
        match users.get_by_email(email).await? {
            Some(user) => {
                if !user.email_verified {
                    users.mark_email_verified(user.id).await?;
                }
                Ok(VerifyOutcome::Loginable(user))
            }
            None => Ok(VerifyOutcome::RequiresRegistration(email.clone())),
        }
    }
}

/// Interpret the single-use consume. Only an already-consumed row reads
/// as a lost race; any other failure is a storage error and propagates.
fn consumed(mark: Result<(), RepositoryError>) -> Result<bool, RepositoryError> {
    match mark {
        Ok(()) => Ok(true),
        Err(RepositoryError::NotFound) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Generate a 6-digit one-time code.
///
/// # Panics
///
/// Never panics; every number in the drawn range is six digits.
#[must_use]
pub fn generate_code() -> OneTimeCode {
    use rand::Rng;
    let code: u32 = rand::rng().random_range(100_000..1_000_000);
    OneTimeCode::parse(&code.to_string()).expect("six digits")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_code_format() {
        let code = generate_code();
        assert_eq!(code.as_str().len(), 6);
        assert!(code.as_str().chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_generate_code_range() {
        for _ in 0..100 {
            let code: u32 = generate_code().as_str().parse().expect("valid number");
            assert!(code >= 100_000);
            assert!(code < 1_000_000);
        }
    }

    #[test]
    fn test_lost_consume_race_reads_as_incorrect() {
        assert!(matches!(consumed(Ok(())), Ok(true)));
        assert!(matches!(consumed(Err(RepositoryError::NotFound)), Ok(false)));
    }

    #[test]
    fn test_storage_failure_during_consume_propagates() {
        let mark = Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        assert!(matches!(consumed(mark), Err(RepositoryError::Database(_))));
    }
}
