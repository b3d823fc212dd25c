//! Vendor (tenant storefront) domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::{CustomDomainId, UserId, VendorId};

/// A tenant storefront with exactly one owning seller account.
///
/// `owner_id` is unique in the database, so looking a vendor up by owner is
/// unambiguous: one seller maps to at most one vendor.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Vendor {
    /// Unique vendor ID.
    pub id: VendorId,
    /// Display name of the storefront.
    pub name: String,
    /// The seller who owns this storefront.
    pub owner_id: UserId,
    /// Subdomain label for storefront resolution (e.g. `"acme"` serves
    /// `acme.bazaar.example`). Unique when present.
    pub domain: Option<String>,
    /// Custom domain assigned to this vendor, if any.
    pub custom_domain_id: Option<CustomDomainId>,
    /// Account that created this vendor.
    pub created_by: Option<UserId>,
    /// When the vendor was created.
    pub created_at: DateTime<Utc>,
    /// When the vendor was last updated.
    pub updated_at: DateTime<Utc>,
}
