//! Vendor (storefront tenant) routes.
//!
//! Reads are public. A seller may claim exactly one vendor; super admins
//! may create vendors for any owner. Updates are vendor-scoped writes.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use bazaar_core::{UserId, VendorId};

use crate::db::vendors::VendorRepository;
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::state::AppState;
use crate::tenancy::{Action, Actor, authorize};

/// Request to create a vendor.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateVendorRequest {
    pub name: String,
    /// Owner account; super admins may set it, sellers always own theirs.
    #[serde(default)]
    pub owner_id: Option<UserId>,
    /// Subdomain label for storefront resolution.
    #[serde(default)]
    pub domain: Option<String>,
}

/// Request to update a vendor.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateVendorRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
}

/// List all vendors.
///
/// GET /api/vendors
///
/// # Errors
///
/// Returns `AppError::Persistence` on storage failure.
pub async fn list(State(state): State<AppState>) -> Result<Json<Value>> {
    let vendors = VendorRepository::new(state.pool()).list().await?;
    Ok(Json(json!({ "vendors": vendors })))
}

/// Fetch one vendor.
///
/// GET /api/vendors/{id}
///
/// # Errors
///
/// Returns `AppError::NotFound` for an absent vendor.
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<VendorId>,
) -> Result<Json<Value>> {
    let vendor = VendorRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("vendor not found".to_owned()))?;
    Ok(Json(json!({ "vendor": vendor })))
}

/// Create a vendor.
///
/// POST /api/vendors
///
/// # Errors
///
/// Returns `AppError::Permission` for buyers and admins,
/// `AppError::Conflict` when the owner already has a vendor or the
/// subdomain is taken.
pub async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(req): Json<CreateVendorRequest>,
) -> Result<Json<Value>> {
    let vendors = VendorRepository::new(state.pool());

    let owner = match current.user.role {
        bazaar_core::Role::SuperAdmin => req.owner_id.unwrap_or(current.user.id),
        bazaar_core::Role::Seller => {
            if req.owner_id.is_some_and(|id| id != current.user.id) {
                return Err(AppError::Permission("sellers may only claim their own vendor"));
            }
            current.user.id
        }
        _ => return Err(AppError::Permission("your role cannot create vendors")),
    };

    let vendor = vendors
        .create(
            &req.name,
            owner,
            req.domain.as_deref(),
            Some(current.user.id),
        )
        .await?;

    tracing::info!(vendor_id = %vendor.id, owner_id = %owner, "Vendor created");
    Ok(Json(json!({ "vendor": vendor })))
}

/// Update a vendor's name or subdomain.
///
/// PUT /api/vendors/{id}
///
/// # Errors
///
/// Returns `AppError::NotFound` for an absent vendor and
/// `AppError::Permission` unless the actor owns it (or is super admin).
pub async fn update(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<VendorId>,
    Json(req): Json<UpdateVendorRequest>,
) -> Result<Json<Value>> {
    let vendors = VendorRepository::new(state.pool());

    let vendor = vendors
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("vendor not found".to_owned()))?;

    let actor = Actor::for_user(&current.user, &vendors).await?;
    AppError::require(authorize(
        &actor,
        &Action::WriteVendorScoped { vendor_id: vendor.id },
    ))?;

    let updated = vendors
        .update(vendor.id, req.name.as_deref(), req.domain.as_deref())
        .await?;

    Ok(Json(json!({ "vendor": updated })))
}
