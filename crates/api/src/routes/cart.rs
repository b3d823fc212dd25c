//! Cart routes.
//!
//! The cart belongs to the effective user; every line is keyed by the
//! full (product, size, color) combination, for updates and removals as
//! much as for the merging add.

use axum::{
    Json,
    extract::State,
};
use serde::Deserialize;
use serde_json::{Value, json};

use bazaar_core::ProductId;

use crate::db::{cart::CartRepository, products::ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// Request to add a product variant to the cart.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub quantity: i32,
    /// Empty string means the product has no size variant.
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub color: String,
}

/// Request to set a cart line's quantity, selected by the full key.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateCartRequest {
    pub product_id: ProductId,
    pub quantity: i32,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub color: String,
}

/// Request to remove a cart line, selected by the full key.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoveFromCartRequest {
    pub product_id: ProductId,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub color: String,
}

fn require_positive_quantity(quantity: i32) -> Result<()> {
    if quantity >= 1 {
        Ok(())
    } else {
        Err(AppError::Validation("quantity must be at least 1".to_owned()))
    }
}

/// List the current user's cart.
///
/// GET /api/cart
///
/// # Errors
///
/// Returns `AppError::Persistence` on storage failure.
pub async fn list(State(state): State<AppState>, current: CurrentUser) -> Result<Json<Value>> {
    let items = CartRepository::new(state.pool())
        .list(current.user.id)
        .await?;
    Ok(Json(json!({ "items": items })))
}

/// Add a product variant to the cart, merging into an existing line.
///
/// POST /api/cart
///
/// Re-adding the same (product, size, color) increments the existing
/// line instead of duplicating it.
///
/// # Errors
///
/// Returns `AppError::Validation` for a quantity below 1 and
/// `AppError::NotFound` for an absent product.
pub async fn add(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(req): Json<AddToCartRequest>,
) -> Result<Json<Value>> {
    require_positive_quantity(req.quantity)?;

    ProductRepository::new(state.pool())
        .get_by_id(req.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("product not found".to_owned()))?;

    let item = CartRepository::new(state.pool())
        .add(
            current.user.id,
            req.product_id,
            req.quantity,
            &req.size,
            &req.color,
        )
        .await?;

    Ok(Json(json!({ "item": item })))
}

/// Set a cart line's quantity.
///
/// PUT /api/cart
///
/// # Errors
///
/// Returns `AppError::Validation` for a quantity below 1 and
/// `AppError::NotFound` when no line matches the full key.
pub async fn update(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(req): Json<UpdateCartRequest>,
) -> Result<Json<Value>> {
    require_positive_quantity(req.quantity)?;

    let item = CartRepository::new(state.pool())
        .set_quantity(
            current.user.id,
            req.product_id,
            &req.size,
            &req.color,
            req.quantity,
        )
        .await?;

    Ok(Json(json!({ "item": item })))
}

/// Remove a cart line.
///
/// DELETE /api/cart
///
/// # Errors
///
/// Returns `AppError::NotFound` when no line matches the full key.
pub async fn remove(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(req): Json<RemoveFromCartRequest>,
) -> Result<Json<Value>> {
    CartRepository::new(state.pool())
        .remove(current.user.id, req.product_id, &req.size, &req.color)
        .await?;

    Ok(Json(json!({ "message": "item removed" })))
}
