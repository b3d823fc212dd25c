//! User administration routes.
//!
//! Listing and creation are open to admins; role changes and deletion go
//! through the tenancy resolver, which reserves them to super admins.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use bazaar_core::{Role, UserId};

use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::state::AppState;
use crate::tenancy::{Action, Actor, authorize};

/// Request to create a user account.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateUserRequest {
    pub email: String,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Request to change a user's role.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

fn require_admin(current: &CurrentUser) -> Result<()> {
    if current.user.role.is_admin() {
        Ok(())
    } else {
        Err(AppError::Permission("admin access required"))
    }
}

/// List all user accounts.
///
/// GET /api/admin/users
///
/// # Errors
///
/// Returns `AppError::Permission` unless the effective role is admin or
/// super admin.
pub async fn list(State(state): State<AppState>, current: CurrentUser) -> Result<Json<Value>> {
    require_admin(&current)?;

    let users = UserRepository::new(state.pool()).list().await?;
    Ok(Json(json!({ "users": users })))
}

/// Create a user account with an optional role (buyer by default).
///
/// POST /api/admin/users
///
/// # Errors
///
/// Returns `AppError::Permission` for non-admins and `AppError::Conflict`
/// for a duplicate email.
pub async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<Value>> {
    require_admin(&current)?;

    let email = bazaar_core::Email::parse(&req.email)
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let role = req.role.unwrap_or(Role::Buyer);

    let user = UserRepository::new(state.pool())
        .create(&email, role, Some(current.user.id))
        .await?;

    tracing::info!(user_id = %user.id, role = %role, "User created by admin");
    Ok(Json(json!({ "user": user })))
}

/// Change a user's role.
///
/// PATCH /api/admin/users/{id}/role
///
/// # Errors
///
/// Returns `AppError::Permission` unless the effective role is super admin
/// and `AppError::NotFound` for an absent target.
pub async fn update_role(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<UserId>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<Json<Value>> {
    let actor = Actor::for_user(&current.user, &crate::db::vendors::VendorRepository::new(
        state.pool(),
    ))
    .await?;
    AppError::require(authorize(&actor, &Action::ChangeUserRole { target: id }))?;

    let users = UserRepository::new(state.pool());
    let target = users
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_owned()))?;

    let user = users.update_role(target.id, req.role).await?;

    tracing::info!(user_id = %user.id, role = %req.role, "User role changed");
    Ok(Json(json!({ "user": user })))
}

/// Delete a user account.
///
/// DELETE /api/admin/users/{id}
///
/// Self-deletion and accounts flagged non-deletable are refused for every
/// role.
///
/// # Errors
///
/// Returns `AppError::Permission` per the resolver and `AppError::NotFound`
/// for an absent target.
pub async fn delete(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<UserId>,
) -> Result<Json<Value>> {
    let users = UserRepository::new(state.pool());
    let target = users
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_owned()))?;

    let actor = Actor::for_user(&current.user, &crate::db::vendors::VendorRepository::new(
        state.pool(),
    ))
    .await?;
    AppError::require(authorize(
        &actor,
        &Action::DeleteUser {
            target: target.id,
            target_deletable: target.deletable,
        },
    ))?;

    users.delete(target.id).await?;

    tracing::info!(user_id = %target.id, "User deleted");
    Ok(Json(json!({ "message": "user deleted" })))
}
