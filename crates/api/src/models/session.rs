//! Session state, including impersonation.
//!
//! The per-session authentication state is a single immutable tagged value
//! stored under one session key, never ambient mutable globals. Transitions
//! are pure functions here; the HTTP layer persists the resulting value back
//! into the tower-session.
//!
//! State machine:
//!
//! ```text
//! Anonymous -> Authenticated(user) -> Impersonating(original, target)
//!     ^               ^    |                  |
//!     |               +----+ exit             |
//!     +--- logout (from any state) -----------+
//! ```

use serde::{Deserialize, Serialize};

use bazaar_core::UserId;

/// Session keys for authentication data.
pub mod session_keys {
    /// Key for the [`super::SessionState`] value.
    pub const AUTH_STATE: &str = "auth_state";

    /// Key for the email address verified by a one-time code but not yet
    /// attached to an account. Registration consumes it.
    pub const PENDING_EMAIL: &str = "pending_email";
}

/// Errors from invalid session state transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionStateError {
    /// Impersonation requires an authenticated, non-impersonating session.
    #[error("not authenticated")]
    NotAuthenticated,
    /// Starting impersonation while already impersonating is a hard error;
    /// exit the current impersonation first.
    #[error("already impersonating another user")]
    AlreadyImpersonating,
    /// Exit called while no impersonation is active.
    #[error("no active impersonation")]
    NotImpersonating,
}

/// Per-session authentication state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    /// No identity attached.
    #[default]
    Anonymous,
    /// Logged in as `user_id`.
    Authenticated {
        /// The logged-in user.
        user_id: UserId,
    },
    /// An admin acting as another user. All downstream authorization uses
    /// the impersonated identity; the original is kept for exit and for UI
    /// transparency.
    Impersonating {
        /// The admin who started the impersonation.
        original_user_id: UserId,
        /// The user being impersonated.
        impersonated_user_id: UserId,
    },
}

impl SessionState {
    /// Transition to `Authenticated` after a successful login.
    #[must_use]
    pub const fn login(user_id: UserId) -> Self {
        Self::Authenticated { user_id }
    }

    /// Begin impersonating `target`.
    ///
    /// The caller is responsible for the role check (admin or super admin)
    /// and for verifying the target exists; this guards only the state
    /// machine itself.
    ///
    /// # Errors
    ///
    /// Returns an error when anonymous or when already impersonating:
    /// re-entrant impersonation would silently overwrite the original
    /// identity, so it is rejected outright.
    pub const fn start_impersonation(&self, target: UserId) -> Result<Self, SessionStateError> {
        match self {
            Self::Anonymous => Err(SessionStateError::NotAuthenticated),
            Self::Impersonating { .. } => Err(SessionStateError::AlreadyImpersonating),
            Self::Authenticated { user_id } => Ok(Self::Impersonating {
                original_user_id: *user_id,
                impersonated_user_id: target,
            }),
        }
    }

    /// End impersonation, restoring the original identity.
    ///
    /// # Errors
    ///
    /// Returns an error if no impersonation is active.
    pub const fn exit_impersonation(&self) -> Result<Self, SessionStateError> {
        match self {
            Self::Impersonating {
                original_user_id, ..
            } => Ok(Self::Authenticated {
                user_id: *original_user_id,
            }),
            _ => Err(SessionStateError::NotImpersonating),
        }
    }

    /// Transition to `Anonymous` from any state.
    #[must_use]
    pub const fn logout(&self) -> Self {
        Self::Anonymous
    }

    /// The identity every downstream check acts as: the impersonated user
    /// while impersonation is active, otherwise the logged-in user.
    #[must_use]
    pub const fn effective_user_id(&self) -> Option<UserId> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated { user_id } => Some(*user_id),
            Self::Impersonating {
                impersonated_user_id,
                ..
            } => Some(*impersonated_user_id),
        }
    }

    /// The original identity behind an active impersonation, if any.
    #[must_use]
    pub const fn original_user_id(&self) -> Option<UserId> {
        match self {
            Self::Impersonating {
                original_user_id, ..
            } => Some(*original_user_id),
            _ => None,
        }
    }

    /// Whether an impersonation is active.
    #[must_use]
    pub const fn is_impersonating(&self) -> bool {
        matches!(self, Self::Impersonating { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ADMIN: UserId = UserId::new(1);
    const SELLER: UserId = UserId::new(2);
    const OTHER: UserId = UserId::new(3);

    #[test]
    fn test_login_attaches_identity() {
        let state = SessionState::login(ADMIN);
        assert_eq!(state.effective_user_id(), Some(ADMIN));
        assert_eq!(state.original_user_id(), None);
        assert!(!state.is_impersonating());
    }

    #[test]
    fn test_impersonation_switches_effective_identity() {
        let state = SessionState::login(ADMIN).start_impersonation(SELLER).unwrap();
        assert_eq!(state.effective_user_id(), Some(SELLER));
        assert_eq!(state.original_user_id(), Some(ADMIN));
        assert!(state.is_impersonating());
    }

    #[test]
    fn test_exit_restores_original_identity() {
        let state = SessionState::login(ADMIN).start_impersonation(SELLER).unwrap();
        let state = state.exit_impersonation().unwrap();
        assert_eq!(state, SessionState::Authenticated { user_id: ADMIN });
    }

    #[test]
    fn test_nested_impersonation_is_rejected() {
        let state = SessionState::login(ADMIN).start_impersonation(SELLER).unwrap();
        assert_eq!(
            state.start_impersonation(OTHER),
            Err(SessionStateError::AlreadyImpersonating)
        );
        // The original identity is untouched by the failed attempt.
        assert_eq!(state.original_user_id(), Some(ADMIN));
    }

    #[test]
    fn test_impersonation_requires_authentication() {
        assert_eq!(
            SessionState::Anonymous.start_impersonation(SELLER),
            Err(SessionStateError::NotAuthenticated)
        );
    }

    #[test]
    fn test_exit_without_impersonation_fails() {
        assert_eq!(
            SessionState::login(ADMIN).exit_impersonation(),
            Err(SessionStateError::NotImpersonating)
        );
        assert_eq!(
            SessionState::Anonymous.exit_impersonation(),
            Err(SessionStateError::NotImpersonating)
        );
    }

    #[test]
    fn test_logout_from_any_state() {
        assert_eq!(SessionState::Anonymous.logout(), SessionState::Anonymous);
        assert_eq!(SessionState::login(ADMIN).logout(), SessionState::Anonymous);
        let impersonating = SessionState::login(ADMIN).start_impersonation(SELLER).unwrap();
        assert_eq!(impersonating.logout(), SessionState::Anonymous);
    }

    #[test]
    fn test_serde_tagged_form() {
        let state = SessionState::login(ADMIN).start_impersonation(SELLER).unwrap();
        let json = serde_json::to_string(&state).unwrap();
        let parsed: SessionState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, state);
        assert!(json.contains("\"state\":\"impersonating\""));
    }
}
