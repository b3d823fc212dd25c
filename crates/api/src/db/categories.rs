//! Category repository.

use sqlx::PgPool;

use bazaar_core::{CategoryId, UserId, VendorId};

use super::RepositoryError;
use crate::models::Category;
use crate::tenancy::CategoryScope;

const CATEGORY_COLUMNS: &str =
    "id, name, vendor_id, is_global, created_by, created_at, updated_at";

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a category by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(category)
    }

    /// List the categories visible under `scope`.
    ///
    /// An empty scope yields an empty list without touching the database;
    /// buyers and anonymous visitors see no categories at all.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_in_scope(
        &self,
        scope: CategoryScope,
    ) -> Result<Vec<Category>, RepositoryError> {
        let categories = match scope {
            CategoryScope::Empty => Vec::new(),
            CategoryScope::All => {
                sqlx::query_as::<_, Category>(&format!(
                    "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY name"
                ))
                .fetch_all(self.pool)
                .await?
            }
            CategoryScope::GlobalAndVendor(vendor_id) => {
                sqlx::query_as::<_, Category>(&format!(
                    "SELECT {CATEGORY_COLUMNS} FROM categories \
                     WHERE is_global OR vendor_id = $1 \
                     ORDER BY name"
                ))
                .bind(vendor_id)
                .fetch_all(self.pool)
                .await?
            }
        };

        Ok(categories)
    }

    /// Create a category. Global categories carry no vendor; vendor-scoped
    /// ones must name their vendor (the CHECK constraint backs this up).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        name: &str,
        vendor_id: Option<VendorId>,
        created_by: Option<UserId>,
    ) -> Result<Category, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "INSERT INTO categories (name, vendor_id, is_global, created_by) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(name)
        .bind(vendor_id)
        .bind(vendor_id.is_none())
        .bind(created_by)
        .fetch_one(self.pool)
        .await?;

        Ok(category)
    }

    /// Rename a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist.
    pub async fn rename(&self, id: CategoryId, name: &str) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>(&format!(
            "UPDATE categories SET name = $1, updated_at = now() WHERE id = $2 \
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(name)
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist.
    pub async fn delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
