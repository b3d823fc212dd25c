//! Order routes.
//!
//! Checkout snapshots the cart into an order inside one transaction;
//! reads are scoped to the owning buyer, the owning vendor's seller, or
//! an admin. Status updates funnel through a single resolver-gated
//! handler, permissive about which status follows which.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use bazaar_core::{OrderId, OrderStatus, VendorId};

use crate::db::{orders::OrderRepository, vendors::VendorRepository};
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::Order;
use crate::state::AppState;
use crate::tenancy::{Action, Actor, OrderScope, authorize, order_scope};

/// Request to check out the current cart.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckoutRequest {
    pub vendor_id: VendorId,
    pub shipping_address: String,
}

/// Request to change an order's status.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// List orders visible to the current actor.
///
/// GET /api/orders
///
/// Buyers see their own orders, sellers their vendor's, admins
/// everything. The scope comes from the resolver, not from the handler.
///
/// # Errors
///
/// Returns `AppError::Persistence` on storage failure.
pub async fn list(State(state): State<AppState>, current: CurrentUser) -> Result<Json<Value>> {
    let orders = OrderRepository::new(state.pool());
    let actor = Actor::for_user(&current.user, &VendorRepository::new(state.pool())).await?;

    let visible = match order_scope(&actor) {
        OrderScope::All => orders.list_all().await?,
        OrderScope::Vendor(vendor_id) => orders.list_for_vendor(vendor_id).await?,
        OrderScope::Customer(user_id) => orders.list_for_customer(user_id).await?,
        OrderScope::Empty => Vec::new(),
    };

    Ok(Json(json!({ "orders": visible })))
}

/// Fetch one order with its line items.
///
/// GET /api/orders/{id}
///
/// An order the actor may not see answers 404, indistinguishable from
/// one that does not exist.
///
/// # Errors
///
/// Returns `AppError::NotFound` for absent or invisible orders.
pub async fn get(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<OrderId>,
) -> Result<Json<Value>> {
    let orders = OrderRepository::new(state.pool());
    let order = orders
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("order not found".to_owned()))?;

    require_visible(&state, &current, &order).await?;

    let items = orders.items(order.id).await?;
    Ok(Json(json!({ "order": order, "items": items })))
}

/// Create an order from the current cart.
///
/// POST /api/orders/checkout
///
/// The read-cart, compute-total, insert-order, clear-cart sequence runs
/// in one transaction; a failed checkout leaves the cart intact.
///
/// # Errors
///
/// Returns `AppError::Validation` for an empty cart.
pub async fn checkout(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(req): Json<CheckoutRequest>,
) -> Result<Json<Value>> {
    if req.shipping_address.trim().is_empty() {
        return Err(AppError::Validation(
            "shipping_address must not be empty".to_owned(),
        ));
    }

    VendorRepository::new(state.pool())
        .get_by_id(req.vendor_id)
        .await?
        .ok_or_else(|| AppError::NotFound("vendor not found".to_owned()))?;

    let order = OrderRepository::new(state.pool())
        .checkout(current.user.id, req.vendor_id, &req.shipping_address)
        .await?;

    tracing::info!(
        order_id = %order.id,
        customer_id = %current.user.id,
        total = %order.total,
        "Order created"
    );
    Ok(Json(json!({ "order": order })))
}

/// Change an order's status.
///
/// PATCH /api/orders/{id}/status
///
/// Any valid status may follow any other; there is no forward-only
/// transition graph.
///
/// # Errors
///
/// Returns `AppError::NotFound` for an absent order and
/// `AppError::Permission` per the resolver.
pub async fn update_status(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<OrderId>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Value>> {
    let orders = OrderRepository::new(state.pool());
    let order = orders
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("order not found".to_owned()))?;

    let actor = Actor::for_user(&current.user, &VendorRepository::new(state.pool())).await?;
    AppError::require(authorize(
        &actor,
        &Action::UpdateOrderStatus {
            vendor_id: order.vendor_id,
        },
    ))?;

    let updated = orders.update_status(order.id, req.status).await?;

    tracing::info!(order_id = %updated.id, status = %req.status, "Order status changed");
    Ok(Json(json!({ "order": updated })))
}

/// Check order visibility through the resolver. Denials become 404 to
/// avoid leaking existence.
async fn require_visible(state: &AppState, current: &CurrentUser, order: &Order) -> Result<()> {
    let actor = Actor::for_user(&current.user, &VendorRepository::new(state.pool())).await?;

    let decision = authorize(
        &actor,
        &Action::ReadOrder {
            customer_id: order.customer_id,
            vendor_id: order.vendor_id,
        },
    );
    if decision.is_allowed() {
        Ok(())
    } else {
        Err(AppError::NotFound("order not found".to_owned()))
    }
}
