//! Vendor repository.

use sqlx::PgPool;

use bazaar_core::{UserId, VendorId};

use super::RepositoryError;
use crate::models::Vendor;

const VENDOR_COLUMNS: &str = "id, name, owner_id, domain, custom_domain_id, created_by, \
                              created_at, updated_at";

/// Repository for vendor database operations.
pub struct VendorRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> VendorRepository<'a> {
    /// Create a new vendor repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a vendor by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: VendorId) -> Result<Option<Vendor>, RepositoryError> {
        let vendor = sqlx::query_as::<_, Vendor>(&format!(
            "SELECT {VENDOR_COLUMNS} FROM vendors WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(vendor)
    }

    /// Get the vendor owned by `owner`.
    ///
    /// `owner_id` is unique, so a seller maps to at most one vendor.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_owner(&self, owner: UserId) -> Result<Option<Vendor>, RepositoryError> {
        let vendor = sqlx::query_as::<_, Vendor>(&format!(
            "SELECT {VENDOR_COLUMNS} FROM vendors WHERE owner_id = $1"
        ))
        .bind(owner)
        .fetch_optional(self.pool)
        .await?;

        Ok(vendor)
    }

    /// Get a vendor by its subdomain label (the `domain` column).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_domain(&self, domain: &str) -> Result<Option<Vendor>, RepositoryError> {
        let vendor = sqlx::query_as::<_, Vendor>(&format!(
            "SELECT {VENDOR_COLUMNS} FROM vendors WHERE domain = $1"
        ))
        .bind(domain)
        .fetch_optional(self.pool)
        .await?;

        Ok(vendor)
    }

    /// Get the vendor whose assigned custom domain matches `host` exactly.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_custom_domain(
        &self,
        host: &str,
    ) -> Result<Option<Vendor>, RepositoryError> {
        let vendor = sqlx::query_as::<_, Vendor>(&format!(
            "SELECT v.id, v.name, v.owner_id, v.domain, v.custom_domain_id, v.created_by, \
                    v.created_at, v.updated_at \
             FROM vendors v \
             JOIN custom_domains cd ON cd.id = v.custom_domain_id \
             WHERE cd.domain = $1"
        ))
        .bind(host)
        .fetch_optional(self.pool)
        .await?;

        Ok(vendor)
    }

    /// List all vendors, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Vendor>, RepositoryError> {
        let vendors = sqlx::query_as::<_, Vendor>(&format!(
            "SELECT {VENDOR_COLUMNS} FROM vendors ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(vendors)
    }

    /// Create a vendor for `owner`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the owner already has a vendor
    /// or the subdomain label is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        name: &str,
        owner: UserId,
        domain: Option<&str>,
        created_by: Option<UserId>,
    ) -> Result<Vendor, RepositoryError> {
        let vendor = sqlx::query_as::<_, Vendor>(&format!(
            "INSERT INTO vendors (name, owner_id, domain, created_by) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {VENDOR_COLUMNS}"
        ))
        .bind(name)
        .bind(owner)
        .bind(domain)
        .bind(created_by)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique_violation(e, "vendor"))?;

        Ok(vendor)
    }

    /// Update a vendor's name and/or subdomain label.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the vendor doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new subdomain is taken.
    pub async fn update(
        &self,
        id: VendorId,
        name: Option<&str>,
        domain: Option<&str>,
    ) -> Result<Vendor, RepositoryError> {
        sqlx::query_as::<_, Vendor>(&format!(
            "UPDATE vendors \
             SET name = COALESCE($1, name), \
                 domain = COALESCE($2, domain), \
                 updated_at = now() \
             WHERE id = $3 \
             RETURNING {VENDOR_COLUMNS}"
        ))
        .bind(name)
        .bind(domain)
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique_violation(e, "vendor domain"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Point a vendor at a custom domain (or clear the assignment).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the vendor doesn't exist.
    pub async fn set_custom_domain(
        &self,
        id: VendorId,
        custom_domain_id: Option<bazaar_core::CustomDomainId>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE vendors SET custom_domain_id = $1, updated_at = now() WHERE id = $2",
        )
        .bind(custom_domain_id)
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
