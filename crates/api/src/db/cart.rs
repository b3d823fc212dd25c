//! Cart repository.
//!
//! The merge invariant lives in SQL: re-adding an existing
//! `(user_id, product_id, size, color)` combination runs as a single
//! conditional upsert, so concurrent identical adds each land their
//! increment. There is no read-then-write window to lose one.

use sqlx::PgPool;

use bazaar_core::{ProductId, UserId};

use super::RepositoryError;
use crate::models::CartItem;

const CART_COLUMNS: &str =
    "id, user_id, product_id, quantity, size, color, created_at, updated_at";

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a user's cart lines, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<CartItem>, RepositoryError> {
        let items = sqlx::query_as::<_, CartItem>(&format!(
            "SELECT {CART_COLUMNS} FROM cart_items WHERE user_id = $1 ORDER BY created_at"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }

    /// Add `quantity` of a product variant to the cart, merging into an
    /// existing line when the full variant key matches.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
        size: &str,
        color: &str,
    ) -> Result<CartItem, RepositoryError> {
        // Atomic increment on conflict; two racing adds both count.
        let item = sqlx::query_as::<_, CartItem>(&format!(
            "INSERT INTO cart_items (user_id, product_id, quantity, size, color) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (user_id, product_id, size, color) \
             DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity, \
                           updated_at = now() \
             RETURNING {CART_COLUMNS}"
        ))
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .bind(size)
        .bind(color)
        .fetch_one(self.pool)
        .await?;

        Ok(item)
    }

    /// Set the quantity of one cart line, selected by the full variant key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no matching line exists.
    pub async fn set_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        size: &str,
        color: &str,
        quantity: i32,
    ) -> Result<CartItem, RepositoryError> {
        sqlx::query_as::<_, CartItem>(&format!(
            "UPDATE cart_items SET quantity = $1, updated_at = now() \
             WHERE user_id = $2 AND product_id = $3 AND size = $4 AND color = $5 \
             RETURNING {CART_COLUMNS}"
        ))
        .bind(quantity)
        .bind(user_id)
        .bind(product_id)
        .bind(size)
        .bind(color)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Remove one cart line, selected by the full variant key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no matching line exists.
    pub async fn remove(
        &self,
        user_id: UserId,
        product_id: ProductId,
        size: &str,
        color: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM cart_items \
             WHERE user_id = $1 AND product_id = $2 AND size = $3 AND color = $4",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(size)
        .bind(color)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
