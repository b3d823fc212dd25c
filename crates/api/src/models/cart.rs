//! Cart domain types and total computation.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::{CartItemId, Price, PriceError, ProductId, UserId};

/// One line in a user's cart.
///
/// The identity of a line is `(user_id, product_id, size, color)`; adding the
/// same combination again increments the quantity instead of creating a
/// second row. Size and color use the empty string for "no variant" so the
/// uniqueness key is total.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartItem {
    /// Unique cart line ID.
    pub id: CartItemId,
    /// Owning user.
    pub user_id: UserId,
    /// Product in this line.
    pub product_id: ProductId,
    /// Quantity, always at least 1.
    pub quantity: i32,
    /// Size variant, empty string when not applicable.
    pub size: String,
    /// Color variant, empty string when not applicable.
    pub color: String,
    /// When this line was first added.
    pub created_at: DateTime<Utc>,
    /// When this line was last changed.
    pub updated_at: DateTime<Utc>,
}

/// A cart line joined with the product's live price, read inside the
/// checkout transaction.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CartLine {
    /// Product in this line.
    pub product_id: ProductId,
    /// Quantity ordered.
    pub quantity: i32,
    /// Unit price at checkout time; becomes the frozen order-item price.
    pub price: Price,
}

/// Compute the exact decimal total for a set of cart lines.
///
/// # Errors
///
/// Returns an error if any line has a quantity below 1 or the arithmetic
/// overflows.
pub fn cart_total(lines: &[CartLine]) -> Result<Price, PriceError> {
    let mut total = Price::ZERO;
    for line in lines {
        total = total.checked_add(line.price.line_total(line.quantity)?)?;
    }
    Ok(total)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(price: &str, quantity: i32) -> CartLine {
        CartLine {
            product_id: ProductId::new(1),
            quantity,
            price: Price::parse(price).unwrap(),
        }
    }

    #[test]
    fn test_total_is_exact() {
        let lines = vec![line("10.50", 2), line("4.99", 1)];
        assert_eq!(cart_total(&lines).unwrap().to_string(), "25.99");
    }

    #[test]
    fn test_total_of_empty_cart_is_zero() {
        assert_eq!(cart_total(&[]).unwrap(), Price::ZERO);
    }

    #[test]
    fn test_total_rejects_bad_quantity() {
        let lines = vec![line("1.00", 0)];
        assert!(matches!(
            cart_total(&lines),
            Err(PriceError::InvalidQuantity)
        ));
    }
}
