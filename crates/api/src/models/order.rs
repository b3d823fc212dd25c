//! Order domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::{OrderId, OrderItemId, OrderStatus, Price, ProductId, UserId, VendorId};

/// An order created from a cart at checkout.
///
/// `total` is a frozen snapshot computed at creation time; it is never
/// recomputed from live product prices.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// The buyer who placed the order.
    pub customer_id: UserId,
    /// The vendor fulfilling the order.
    pub vendor_id: VendorId,
    /// Exact decimal total at creation time.
    pub total: Price,
    /// Current lifecycle status.
    pub status: OrderStatus,
    /// Free-form shipping address.
    pub shipping_address: String,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
    /// When the order was last updated.
    pub updated_at: DateTime<Utc>,
}

/// One line of an order, with the price captured at order time.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    /// Unique order item ID.
    pub id: OrderItemId,
    /// Owning order.
    pub order_id: OrderId,
    /// Product ordered.
    pub product_id: ProductId,
    /// Quantity ordered.
    pub quantity: i32,
    /// Unit price at order time, immutable thereafter.
    pub price: Price,
}
