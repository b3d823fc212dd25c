//! Passwordless authentication routes.
//!
//! Login is a two-step code exchange: `send-otp` mails a six-digit code,
//! `verify-otp` trades it for a session. When the verified email has no
//! account yet, the email is parked in the session and `register` turns it
//! into a buyer account.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;

use bazaar_core::{Email, OneTimeCode, Role};

use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::{CurrentUser, store_session_state};
use crate::models::{SessionState, User, session_keys};
use crate::services::otp::{OtpError, OtpService, VerifyOutcome};
use crate::state::AppState;

/// Request to send a one-time code.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendOtpRequest {
    pub email: String,
}

/// Request to verify a one-time code.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub code: String,
}

/// Request to register a new account after code verification.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
}

fn parse_email(raw: &str) -> Result<Email> {
    Email::parse(raw).map_err(|e| AppError::Validation(e.to_string()))
}

impl From<OtpError> for AppError {
    fn from(err: OtpError) -> Self {
        match err {
            OtpError::Delivery(e) => Self::Delivery(e),
            OtpError::Persistence(e) => e.into(),
        }
    }
}

/// Mail a one-time login code.
///
/// POST /api/auth/send-otp
///
/// Always answers the same way for well-formed addresses; whether an
/// account exists is not revealed at this step.
///
/// # Errors
///
/// Returns `AppError` if the email is malformed or dispatch fails.
pub async fn send_otp(
    State(state): State<AppState>,
    Json(req): Json<SendOtpRequest>,
) -> Result<Json<Value>> {
    let email = parse_email(&req.email)?;

    let otp = OtpService::new(state.pool(), state.email());
    otp.request_code(&email).await?;

    Ok(Json(json!({ "message": "code sent" })))
}

/// Verify a one-time code and establish a session.
///
/// POST /api/auth/verify-otp
///
/// On success either logs the session in (known email) or parks the
/// verified email for registration. Any verification failure answers with
/// the same generic message so expired, used, and never-issued codes are
/// indistinguishable.
///
/// # Errors
///
/// Returns `AppError::Validation` with a generic message on mismatch.
pub async fn verify_otp(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<VerifyOtpRequest>,
) -> Result<Json<Value>> {
    let email = parse_email(&req.email)?;

    // A malformed code can never match an issued one; answer with the
    // same generic message as a mismatch.
    let Ok(code) = OneTimeCode::parse(&req.code) else {
        return Err(AppError::Validation("incorrect code".to_owned()));
    };

    let otp = OtpService::new(state.pool(), state.email());
    match otp.verify_code(&email, &code).await? {
        VerifyOutcome::Loginable(user) => {
            let auth = SessionState::login(user.id);
            store_session_state(&session, &auth).await?;
            session
                .remove::<Email>(session_keys::PENDING_EMAIL)
                .await?;

            tracing::info!(user_id = %user.id, "User logged in");
            Ok(Json(json!({ "loginable": true, "user": user })))
        }
        VerifyOutcome::RequiresRegistration(email) => {
            session
                .insert(session_keys::PENDING_EMAIL, &email)
                .await?;

            Ok(Json(json!({
                "requires_registration": true,
                "email": email,
            })))
        }
        VerifyOutcome::Incorrect => Err(AppError::Validation("incorrect code".to_owned())),
    }
}

/// Create a buyer account for a code-verified email and log it in.
///
/// POST /api/auth/register
///
/// The email must match the one parked by `verify-otp` in this session;
/// registration without a prior verification is refused.
///
/// # Errors
///
/// Returns `AppError::Validation` without a verified email in the session
/// and `AppError::Conflict` if the account already exists.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<Value>> {
    let email = parse_email(&req.email)?;

    let pending: Option<Email> = session.get(session_keys::PENDING_EMAIL).await?;
    if pending.as_ref() != Some(&email) {
        return Err(AppError::Validation(
            "verify a login code for this email first".to_owned(),
        ));
    }

    let users = UserRepository::new(state.pool());
    let user = users.create(&email, Role::Buyer, None).await?;
    users.mark_email_verified(user.id).await?;

    let auth = SessionState::login(user.id);
    store_session_state(&session, &auth).await?;
    session
        .remove::<Email>(session_keys::PENDING_EMAIL)
        .await?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok(Json(json!({ "user": user })))
}

/// Drop the session identity.
///
/// POST /api/auth/logout
///
/// # Errors
///
/// Returns `AppError::Session` if the session store fails.
pub async fn logout(session: Session) -> Result<Json<Value>> {
    // Discards every session field, not just the identity.
    session.flush().await?;

    Ok(Json(json!({ "message": "logged out" })))
}

/// Report the current identity, including impersonation transparency.
///
/// GET /api/auth/user
pub async fn current_user(current: CurrentUser) -> Json<Value> {
    Json(current_user_body(&current.user, current.original.as_ref()))
}

/// The `{user, is_impersonating, original_user}` shape shared by every
/// response that echoes the current identity.
pub fn current_user_body(user: &User, original: Option<&User>) -> Value {
    json!({
        "user": user,
        "is_impersonating": original.is_some(),
        "original_user": original,
    })
}
