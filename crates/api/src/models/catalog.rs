//! Category and product domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::{CategoryId, Price, ProductId, UserId, VendorId};

/// A product category, either global or scoped to one vendor.
///
/// Invariant (enforced by a database CHECK as well): `is_global` is true
/// exactly when `vendor_id` is null.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
    /// Unique category ID.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// Owning vendor; null for global categories.
    pub vendor_id: Option<VendorId>,
    /// Whether this category is visible to every storefront.
    pub is_global: bool,
    /// Account that created this category.
    pub created_by: Option<UserId>,
    /// When the category was created.
    pub created_at: DateTime<Utc>,
    /// When the category was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A product in a vendor's catalog.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// The vendor this product belongs to.
    pub vendor_id: VendorId,
    /// Display name.
    pub name: String,
    /// Long-form description.
    pub description: Option<String>,
    /// Current price. Orders snapshot this at checkout time.
    pub price: Price,
    /// Free-form variant data (sizes, colors) as JSON.
    pub variants: Option<serde_json::Value>,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}
