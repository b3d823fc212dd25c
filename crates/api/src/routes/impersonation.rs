//! Admin impersonation routes.
//!
//! Impersonation swaps the session's effective identity to the target
//! user; downstream authorization sees only the target's role and vendor
//! scope. The original admin is kept in the session for the exit and for
//! UI transparency.

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::Value;
use tower_sessions::Session;

use bazaar_core::UserId;

use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::{CurrentUser, load_session_state, store_session_state};
use crate::routes::auth::current_user_body;
use crate::state::AppState;

/// Begin impersonating another user.
///
/// POST /api/admin/impersonate/{user_id}
///
/// Starting a second impersonation without exiting the first is a hard
/// error; the original identity is never silently overwritten.
///
/// # Errors
///
/// Returns `AppError::Permission` unless the effective role is admin or
/// super admin, `AppError::NotFound` for an absent target, and a 400 when
/// already impersonating.
pub async fn start(
    State(state): State<AppState>,
    session: Session,
    current: CurrentUser,
    Path(user_id): Path<UserId>,
) -> Result<Json<Value>> {
    if !current.user.role.is_admin() {
        return Err(AppError::Permission("admin access required"));
    }

    let users = UserRepository::new(state.pool());
    let target = users
        .get_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_owned()))?;

    let auth = load_session_state(&session)
        .await?
        .start_impersonation(target.id)?;
    store_session_state(&session, &auth).await?;

    tracing::info!(
        admin_id = %current.user.id,
        target_id = %target.id,
        "Impersonation started"
    );
    Ok(Json(current_user_body(&target, Some(&current.user))))
}

/// Exit the active impersonation, restoring the original identity.
///
/// POST /api/admin/exit-impersonation
///
/// # Errors
///
/// Returns a 400 when no impersonation is active.
pub async fn exit(State(state): State<AppState>, session: Session) -> Result<Json<Value>> {
    let auth = load_session_state(&session).await?.exit_impersonation()?;
    store_session_state(&session, &auth).await?;

    let original_id = auth
        .effective_user_id()
        .ok_or_else(|| AppError::Internal("impersonation exit left no identity".to_owned()))?;
    let original = UserRepository::new(state.pool())
        .get_by_id(original_id)
        .await?
        .ok_or(AppError::Authentication)?;

    tracing::info!(admin_id = %original.id, "Impersonation ended");
    Ok(Json(current_user_body(&original, None)))
}
