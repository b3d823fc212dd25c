//! Custom domain domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::{CustomDomainId, DomainStatus, UserId, VendorId};

/// A custom storefront domain (e.g. `shop.example.com`).
///
/// A vendor's `custom_domain_id` points back to at most one of these.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CustomDomain {
    /// Unique custom domain ID.
    pub id: CustomDomainId,
    /// The vendor this domain serves, once assigned.
    pub vendor_id: Option<VendorId>,
    /// The full hostname, stored lowercase.
    pub domain: String,
    /// Verification status.
    pub status: DomainStatus,
    /// Admin account that created this entry.
    pub created_by: Option<UserId>,
    /// When the entry was created.
    pub created_at: DateTime<Utc>,
    /// When the entry was last updated.
    pub updated_at: DateTime<Utc>,
}
