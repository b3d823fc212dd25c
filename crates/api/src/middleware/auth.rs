//! Authentication extractors.
//!
//! Handlers take [`CurrentUser`] to require a logged-in (or impersonated)
//! identity, or [`OptionalUser`] where anonymous access is allowed. Both
//! read the tagged session state and resolve the effective user from the
//! database, so a deleted user's stale session stops working immediately.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tower_sessions::Session;

use crate::db::users::UserRepository;
use crate::error::AppError;
use crate::models::{SessionState, User, session_keys};
use crate::state::AppState;

/// The authenticated identity for the current request.
///
/// `user` is the effective identity every authorization check acts as;
/// while impersonation is active that is the impersonated user and
/// `original` carries the admin who started it.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// The effective user.
    pub user: User,
    /// The admin behind an active impersonation, if any.
    pub original: Option<User>,
}

impl CurrentUser {
    /// Whether this request runs under impersonation.
    #[must_use]
    pub const fn is_impersonating(&self) -> bool {
        self.original.is_some()
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AppError::Authentication)?
            .clone();

        let auth_state = load_session_state(&session).await?;

        let Some(effective_id) = auth_state.effective_user_id() else {
            return Err(AppError::Authentication);
        };

        let app_state = AppState::from_ref(state);
        let users = UserRepository::new(app_state.pool());

        let user = users
            .get_by_id(effective_id)
            .await?
            .ok_or(AppError::Authentication)?;

        let original = match auth_state.original_user_id() {
            Some(id) => Some(users.get_by_id(id).await?.ok_or(AppError::Authentication)?),
            None => None,
        };

        Ok(Self { user, original })
    }
}

/// Like [`CurrentUser`] but yields `None` instead of rejecting when the
/// session carries no identity.
pub struct OptionalUser(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match CurrentUser::from_request_parts(parts, state).await {
            Ok(current) => Ok(Self(Some(current))),
            Err(AppError::Authentication) => Ok(Self(None)),
            Err(other) => Err(other),
        }
    }
}

/// Read the session's authentication state, defaulting to anonymous.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn load_session_state(session: &Session) -> Result<SessionState, AppError> {
    Ok(session
        .get::<SessionState>(session_keys::AUTH_STATE)
        .await?
        .unwrap_or_default())
}

/// Persist a new authentication state into the session.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn store_session_state(
    session: &Session,
    state: &SessionState,
) -> Result<(), AppError> {
    session.insert(session_keys::AUTH_STATE, state).await?;
    Ok(())
}
