//! Category routes.
//!
//! Visibility follows the category scope: super admins see everything,
//! sellers see global plus their own vendor's, everyone else gets an
//! empty list. Global writes are super-admin only; vendor writes go
//! through the resolver.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use bazaar_core::{CategoryId, Role, VendorId};

use crate::db::{categories::CategoryRepository, vendors::VendorRepository};
use crate::error::{AppError, Result};
use crate::middleware::{CurrentUser, OptionalUser};
use crate::models::Category;
use crate::state::AppState;
use crate::tenancy::{Action, Actor, authorize, category_scope};

/// Request to create a category.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCategoryRequest {
    pub name: String,
    /// Absent means a global category (super admin only); sellers may
    /// omit it and still get their own vendor.
    #[serde(default)]
    pub vendor_id: Option<VendorId>,
}

/// Request to rename a category.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateCategoryRequest {
    pub name: String,
}

/// List categories visible to the current actor.
///
/// GET /api/categories
///
/// An empty list for buyers and anonymous visitors is the designed
/// answer, not an error.
///
/// # Errors
///
/// Returns `AppError::Persistence` on storage failure.
pub async fn list(
    State(state): State<AppState>,
    OptionalUser(current): OptionalUser,
) -> Result<Json<Value>> {
    let vendors = VendorRepository::new(state.pool());
    let actor = match &current {
        Some(current) => Some(Actor::for_user(&current.user, &vendors).await?),
        None => None,
    };

    let scope = category_scope(actor.as_ref());
    let categories = CategoryRepository::new(state.pool())
        .list_in_scope(scope)
        .await?;

    Ok(Json(json!({ "categories": categories })))
}

/// Create a category.
///
/// POST /api/categories
///
/// # Errors
///
/// Returns `AppError::Permission` per the resolver: global categories
/// require super admin, vendor categories require the owning seller.
pub async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<Json<Value>> {
    let vendors = VendorRepository::new(state.pool());
    let actor = Actor::for_user(&current.user, &vendors).await?;

    // A seller omitting vendor_id is asking for their own vendor, not a
    // global category.
    let vendor_id = match (current.user.role, req.vendor_id) {
        (Role::Seller, None) => Some(
            actor
                .vendor_id
                .ok_or(AppError::Permission("you do not own a vendor"))?,
        ),
        (_, explicit) => explicit,
    };

    let action = vendor_id.map_or(Action::WriteGlobalCategory, |vendor_id| {
        Action::WriteVendorScoped { vendor_id }
    });
    AppError::require(authorize(&actor, &action))?;

    let category = CategoryRepository::new(state.pool())
        .create(&req.name, vendor_id, Some(current.user.id))
        .await?;

    tracing::info!(category_id = %category.id, global = category.is_global, "Category created");
    Ok(Json(json!({ "category": category })))
}

/// Rename a category.
///
/// PATCH /api/categories/{id}
///
/// # Errors
///
/// Returns `AppError::NotFound` for an absent category and
/// `AppError::Permission` per the resolver.
pub async fn update(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<CategoryId>,
    Json(req): Json<UpdateCategoryRequest>,
) -> Result<Json<Value>> {
    let categories = CategoryRepository::new(state.pool());
    let category = fetch_authorized(&state, &current, &categories, id).await?;

    let updated = categories.rename(category.id, &req.name).await?;
    Ok(Json(json!({ "category": updated })))
}

/// Delete a category.
///
/// DELETE /api/categories/{id}
///
/// # Errors
///
/// Returns `AppError::NotFound` for an absent category and
/// `AppError::Permission` per the resolver.
pub async fn delete(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<CategoryId>,
) -> Result<Json<Value>> {
    let categories = CategoryRepository::new(state.pool());
    let category = fetch_authorized(&state, &current, &categories, id).await?;

    categories.delete(category.id).await?;

    tracing::info!(category_id = %category.id, "Category deleted");
    Ok(Json(json!({ "message": "category deleted" })))
}

/// Load a category and check the write appropriate to its scope.
async fn fetch_authorized(
    state: &AppState,
    current: &CurrentUser,
    categories: &CategoryRepository<'_>,
    id: CategoryId,
) -> Result<Category> {
    let category = categories
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("category not found".to_owned()))?;

    let actor = Actor::for_user(&current.user, &VendorRepository::new(state.pool())).await?;
    let action = category
        .vendor_id
        .map_or(Action::WriteGlobalCategory, |vendor_id| {
            Action::WriteVendorScoped { vendor_id }
        });
    AppError::require(authorize(&actor, &action))?;

    Ok(category)
}
