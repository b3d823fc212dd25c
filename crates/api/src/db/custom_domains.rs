//! Custom domain repository.

use sqlx::PgPool;

use bazaar_core::{CustomDomainId, DomainStatus, UserId, VendorId};

use super::RepositoryError;
use crate::models::CustomDomain;

const DOMAIN_COLUMNS: &str =
    "id, vendor_id, domain, status, created_by, created_at, updated_at";

/// Repository for custom domain database operations.
pub struct CustomDomainRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomDomainRepository<'a> {
    /// Create a new custom domain repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a custom domain by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(
        &self,
        id: CustomDomainId,
    ) -> Result<Option<CustomDomain>, RepositoryError> {
        let domain = sqlx::query_as::<_, CustomDomain>(&format!(
            "SELECT {DOMAIN_COLUMNS} FROM custom_domains WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(domain)
    }

    /// List all custom domains, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<CustomDomain>, RepositoryError> {
        let domains = sqlx::query_as::<_, CustomDomain>(&format!(
            "SELECT {DOMAIN_COLUMNS} FROM custom_domains ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(domains)
    }

    /// Register a custom domain. Hostnames are stored lowercase.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the hostname is taken.
    pub async fn create(
        &self,
        domain: &str,
        vendor_id: Option<VendorId>,
        created_by: Option<UserId>,
    ) -> Result<CustomDomain, RepositoryError> {
        let custom_domain = sqlx::query_as::<_, CustomDomain>(&format!(
            "INSERT INTO custom_domains (domain, vendor_id, status, created_by) \
             VALUES (lower($1), $2, $3, $4) \
             RETURNING {DOMAIN_COLUMNS}"
        ))
        .bind(domain)
        .bind(vendor_id)
        .bind(DomainStatus::Pending)
        .bind(created_by)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique_violation(e, "custom domain"))?;

        Ok(custom_domain)
    }

    /// Update a custom domain's vendor assignment and/or status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the domain doesn't exist.
    pub async fn update(
        &self,
        id: CustomDomainId,
        vendor_id: Option<VendorId>,
        status: Option<DomainStatus>,
    ) -> Result<CustomDomain, RepositoryError> {
        sqlx::query_as::<_, CustomDomain>(&format!(
            "UPDATE custom_domains \
             SET vendor_id = COALESCE($1, vendor_id), \
                 status = COALESCE($2, status), \
                 updated_at = now() \
             WHERE id = $3 \
             RETURNING {DOMAIN_COLUMNS}"
        ))
        .bind(vendor_id)
        .bind(status)
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a custom domain.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the domain doesn't exist.
    pub async fn delete(&self, id: CustomDomainId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM custom_domains WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
