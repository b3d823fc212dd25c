//! Order repository, including the checkout transaction.

use sqlx::PgPool;

use bazaar_core::{OrderId, OrderStatus, PriceError, UserId, VendorId};

use super::RepositoryError;
use crate::models::cart::{CartLine, cart_total};
use crate::models::{Order, OrderItem};

const ORDER_COLUMNS: &str =
    "id, customer_id, vendor_id, total, status, shipping_address, created_at, updated_at";

/// Errors from checkout.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// Checkout with an empty cart.
    #[error("cart is empty")]
    EmptyCart,

    /// Total computation failed.
    #[error("cart total: {0}")]
    Price(#[from] PriceError),

    /// Storage failure; the transaction rolled back and the cart is intact.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for CheckoutError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// List a customer's own orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_customer(&self, customer: UserId) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE customer_id = $1 ORDER BY created_at DESC"
        ))
        .bind(customer)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// List a vendor's incoming orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_vendor(&self, vendor: VendorId) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE vendor_id = $1 ORDER BY created_at DESC"
        ))
        .bind(vendor)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// List every order, newest first (super admin view).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// The line items of an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, order: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT id, order_id, product_id, quantity, price \
             FROM order_items WHERE order_id = $1 ORDER BY id",
        )
        .bind(order)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }

    /// Create an order from the user's cart, atomically.
    ///
    /// One transaction covers the whole sequence: read the cart joined with
    /// live product prices (locking the cart rows), compute the exact total,
    /// insert the order and its frozen line items, clear the cart, commit.
    /// Any failure rolls the whole thing back: no order without a cleared
    /// cart, no cleared cart without an order. A concurrent double-submit
    /// serializes on the row locks; the loser finds an empty cart.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` if there are no cart lines, or a
    /// repository error if any statement fails.
    pub async fn checkout(
        &self,
        customer: UserId,
        vendor: VendorId,
        shipping_address: &str,
    ) -> Result<Order, CheckoutError> {
        let mut tx = self.pool.begin().await?;

        let lines = sqlx::query_as::<_, CartLine>(
            "SELECT ci.product_id, ci.quantity, p.price \
             FROM cart_items ci \
             JOIN products p ON p.id = ci.product_id \
             WHERE ci.user_id = $1 \
             ORDER BY ci.created_at \
             FOR UPDATE OF ci",
        )
        .bind(customer)
        .fetch_all(&mut *tx)
        .await?;

        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let total = cart_total(&lines)?;

        let order = sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO orders (customer_id, vendor_id, total, status, shipping_address) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(customer)
        .bind(vendor)
        .bind(total)
        .bind(OrderStatus::Pending)
        .bind(shipping_address)
        .fetch_one(&mut *tx)
        .await?;

        for line in &lines {
            sqlx::query(
                "INSERT INTO order_items (order_id, product_id, quantity, price) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(order.id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.price)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(customer)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(order)
    }

    /// Set an order's status. Transitions are permissive: any valid status
    /// may follow any other.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET status = $1, updated_at = now() WHERE id = $2 \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(status)
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}
