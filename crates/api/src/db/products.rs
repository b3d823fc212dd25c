//! Product repository.

use sqlx::PgPool;

use bazaar_core::{Price, ProductId, VendorId};

use super::RepositoryError;
use crate::models::Product;

const PRODUCT_COLUMNS: &str =
    "id, vendor_id, name, description, price, variants, created_at, updated_at";

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// List products, optionally filtered to one vendor's catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, vendor_id: Option<VendorId>) -> Result<Vec<Product>, RepositoryError> {
        let products = match vendor_id {
            Some(vendor_id) => {
                sqlx::query_as::<_, Product>(&format!(
                    "SELECT {PRODUCT_COLUMNS} FROM products WHERE vendor_id = $1 \
                     ORDER BY created_at DESC"
                ))
                .bind(vendor_id)
                .fetch_all(self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Product>(&format!(
                    "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC"
                ))
                .fetch_all(self.pool)
                .await?
            }
        };

        Ok(products)
    }

    /// Create a product in a vendor's catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        vendor_id: VendorId,
        name: &str,
        description: Option<&str>,
        price: Price,
        variants: Option<&serde_json::Value>,
    ) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products (vendor_id, name, description, price, variants) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(vendor_id)
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(variants)
        .fetch_one(self.pool)
        .await?;

        Ok(product)
    }

    /// Update a product's mutable fields. `None` leaves a field unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn update(
        &self,
        id: ProductId,
        name: Option<&str>,
        description: Option<&str>,
        price: Option<Price>,
        variants: Option<&serde_json::Value>,
    ) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            "UPDATE products \
             SET name = COALESCE($1, name), \
                 description = COALESCE($2, description), \
                 price = COALESCE($3, price), \
                 variants = COALESCE($4, variants), \
                 updated_at = now() \
             WHERE id = $5 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(variants)
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
