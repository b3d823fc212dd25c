//! Custom domain administration routes.
//!
//! Custom hostnames are provisioned by admins, assigned to vendors, and
//! flipped active once DNS is in place. Assignment also points the
//! vendor back at the domain so storefront resolution finds it.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use bazaar_core::{CustomDomainId, DomainStatus, VendorId};

use crate::db::{custom_domains::CustomDomainRepository, vendors::VendorRepository};
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// Request to register a custom domain.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateDomainRequest {
    pub domain: String,
    #[serde(default)]
    pub vendor_id: Option<VendorId>,
}

/// Request to update a custom domain.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateDomainRequest {
    #[serde(default)]
    pub vendor_id: Option<VendorId>,
    #[serde(default)]
    pub status: Option<DomainStatus>,
}

fn require_admin(current: &CurrentUser) -> Result<()> {
    if current.user.role.is_admin() {
        Ok(())
    } else {
        Err(AppError::Permission("admin access required"))
    }
}

/// List custom domains.
///
/// GET /api/admin/custom-domains
///
/// # Errors
///
/// Returns `AppError::Permission` for non-admins.
pub async fn list(State(state): State<AppState>, current: CurrentUser) -> Result<Json<Value>> {
    require_admin(&current)?;

    let domains = CustomDomainRepository::new(state.pool()).list().await?;
    Ok(Json(json!({ "custom_domains": domains })))
}

/// Register a custom domain, pending until activated.
///
/// POST /api/admin/custom-domains
///
/// # Errors
///
/// Returns `AppError::Conflict` for a hostname already registered.
pub async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(req): Json<CreateDomainRequest>,
) -> Result<Json<Value>> {
    require_admin(&current)?;

    if req.domain.trim().is_empty() {
        return Err(AppError::Validation("domain must not be empty".to_owned()));
    }

    let domains = CustomDomainRepository::new(state.pool());
    let custom_domain = domains
        .create(&req.domain, req.vendor_id, Some(current.user.id))
        .await?;

    if let Some(vendor_id) = req.vendor_id {
        VendorRepository::new(state.pool())
            .set_custom_domain(vendor_id, Some(custom_domain.id))
            .await?;
    }

    tracing::info!(domain = %custom_domain.domain, "Custom domain registered");
    Ok(Json(json!({ "custom_domain": custom_domain })))
}

/// Update a custom domain's vendor assignment or status.
///
/// PATCH /api/admin/custom-domains/{id}
///
/// # Errors
///
/// Returns `AppError::NotFound` for an absent domain.
pub async fn update(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<CustomDomainId>,
    Json(req): Json<UpdateDomainRequest>,
) -> Result<Json<Value>> {
    require_admin(&current)?;

    let domains = CustomDomainRepository::new(state.pool());
    let custom_domain = domains.update(id, req.vendor_id, req.status).await?;

    if let Some(vendor_id) = req.vendor_id {
        VendorRepository::new(state.pool())
            .set_custom_domain(vendor_id, Some(custom_domain.id))
            .await?;
    }

    Ok(Json(json!({ "custom_domain": custom_domain })))
}

/// Delete a custom domain.
///
/// DELETE /api/admin/custom-domains/{id}
///
/// # Errors
///
/// Returns `AppError::NotFound` for an absent domain.
pub async fn delete(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<CustomDomainId>,
) -> Result<Json<Value>> {
    require_admin(&current)?;

    let domains = CustomDomainRepository::new(state.pool());
    let custom_domain = domains
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("custom domain not found".to_owned()))?;

    // Unhook the owning vendor before the row goes away.
    if let Some(vendor_id) = custom_domain.vendor_id {
        VendorRepository::new(state.pool())
            .set_custom_domain(vendor_id, None)
            .await?;
    }
    domains.delete(custom_domain.id).await?;

    tracing::info!(domain = %custom_domain.domain, "Custom domain deleted");
    Ok(Json(json!({ "message": "custom domain deleted" })))
}
