//! Product catalog routes.
//!
//! Reads are public; every mutation is a vendor-scoped write through the
//! tenancy resolver. Prices arrive as exact decimal strings.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use bazaar_core::{Price, ProductId, Role, VendorId};

use crate::db::{products::ProductRepository, vendors::VendorRepository};
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::state::AppState;
use crate::tenancy::{Action, Actor, authorize};

/// Filter for the product listing.
#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    #[serde(default)]
    pub vendor_id: Option<VendorId>,
}

/// Request to create a product.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateProductRequest {
    /// Required for super admins; sellers always write to their own vendor.
    #[serde(default)]
    pub vendor_id: Option<VendorId>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Exact decimal string, at most two fraction digits.
    pub price: String,
    #[serde(default)]
    pub variants: Option<Value>,
}

/// Request to update a product. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProductRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub variants: Option<Value>,
}

fn parse_price(raw: &str) -> Result<Price> {
    Price::parse(raw).map_err(|e| AppError::Validation(e.to_string()))
}

/// List products, optionally filtered by vendor.
///
/// GET /api/products
///
/// # Errors
///
/// Returns `AppError::Persistence` on storage failure.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<Value>> {
    let products = ProductRepository::new(state.pool())
        .list(query.vendor_id)
        .await?;
    Ok(Json(json!({ "products": products })))
}

/// Fetch one product.
///
/// GET /api/products/{id}
///
/// # Errors
///
/// Returns `AppError::NotFound` for an absent product.
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Value>> {
    let product = ProductRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("product not found".to_owned()))?;
    Ok(Json(json!({ "product": product })))
}

/// Create a product.
///
/// POST /api/products
///
/// # Errors
///
/// Returns `AppError::Permission` unless the actor may write to the
/// target vendor and `AppError::Validation` for a malformed price.
pub async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(req): Json<CreateProductRequest>,
) -> Result<Json<Value>> {
    let vendors = VendorRepository::new(state.pool());
    let actor = Actor::for_user(&current.user, &vendors).await?;

    // Sellers write to their own vendor; anyone else must name one.
    let vendor_id = match (current.user.role, req.vendor_id) {
        (Role::Seller, None) => actor
            .vendor_id
            .ok_or(AppError::Permission("you do not own a vendor"))?,
        (_, Some(id)) => id,
        (_, None) => {
            return Err(AppError::Validation("vendor_id is required".to_owned()));
        }
    };

    AppError::require(authorize(&actor, &Action::WriteVendorScoped { vendor_id }))?;

    let price = parse_price(&req.price)?;
    let product = ProductRepository::new(state.pool())
        .create(
            vendor_id,
            &req.name,
            req.description.as_deref(),
            price,
            req.variants.as_ref(),
        )
        .await?;

    tracing::info!(product_id = %product.id, vendor_id = %vendor_id, "Product created");
    Ok(Json(json!({ "product": product })))
}

/// Update a product.
///
/// PUT /api/products/{id}
///
/// # Errors
///
/// Returns `AppError::NotFound` for an absent product and
/// `AppError::Permission` unless the actor owns its vendor.
pub async fn update(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<ProductId>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<Value>> {
    let products = ProductRepository::new(state.pool());
    let product = products
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("product not found".to_owned()))?;

    let actor = Actor::for_user(&current.user, &VendorRepository::new(state.pool())).await?;
    AppError::require(authorize(
        &actor,
        &Action::WriteVendorScoped {
            vendor_id: product.vendor_id,
        },
    ))?;

    let price = req.price.as_deref().map(parse_price).transpose()?;
    let updated = products
        .update(
            product.id,
            req.name.as_deref(),
            req.description.as_deref(),
            price,
            req.variants.as_ref(),
        )
        .await?;

    Ok(Json(json!({ "product": updated })))
}

/// Delete a product.
///
/// DELETE /api/products/{id}
///
/// # Errors
///
/// Returns `AppError::NotFound` for an absent product and
/// `AppError::Permission` unless the actor owns its vendor.
pub async fn delete(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<ProductId>,
) -> Result<Json<Value>> {
    let products = ProductRepository::new(state.pool());
    let product = products
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("product not found".to_owned()))?;

    let actor = Actor::for_user(&current.user, &VendorRepository::new(state.pool())).await?;
    AppError::require(authorize(
        &actor,
        &Action::WriteVendorScoped {
            vendor_id: product.vendor_id,
        },
    ))?;

    products.delete(product.id).await?;

    tracing::info!(product_id = %product.id, "Product deleted");
    Ok(Json(json!({ "message": "product deleted" })))
}
