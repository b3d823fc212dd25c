//! Exact decimal money type.
//!
//! Prices and order totals are decimal strings end to end. Arithmetic is
//! checked `rust_decimal` math; floating point never enters the pipeline, so
//! a total like `10.50 × 2 + 4.99` comes out as exactly `25.99`.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing or combining a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input string is not a valid decimal number.
    #[error("invalid price: {0}")]
    Invalid(String),
    /// Prices cannot be negative.
    #[error("price cannot be negative")]
    Negative,
    /// More than two decimal places.
    #[error("price must have at most two decimal places")]
    TooPrecise,
    /// A multiplication or addition overflowed.
    #[error("price arithmetic overflow")]
    Overflow,
    /// Line quantity must be at least one.
    #[error("quantity must be at least 1")]
    InvalidQuantity,
}

/// A non-negative monetary amount with at most two decimal places.
///
/// Serializes to a decimal string (`"25.99"`), never a float. Wraps
/// [`rust_decimal::Decimal`] so sums and line totals are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Parse a price from a decimal string such as `"10.50"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a decimal number, is negative,
    /// or carries more than two decimal places.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount: Decimal = s
            .trim()
            .parse()
            .map_err(|_| PriceError::Invalid(s.to_owned()))?;
        Self::from_decimal(amount)
    }

    /// Wrap an existing [`Decimal`], validating the price constraints.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is negative or has more than two
    /// decimal places.
    pub fn from_decimal(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() {
            return Err(PriceError::Negative);
        }
        if amount.scale() > 2 {
            return Err(PriceError::TooPrecise);
        }
        Ok(Self(amount))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Exact `price × quantity` for one order line.
    ///
    /// # Errors
    ///
    /// Returns an error if `quantity < 1` or the multiplication overflows.
    pub fn line_total(&self, quantity: i32) -> Result<Self, PriceError> {
        if quantity < 1 {
            return Err(PriceError::InvalidQuantity);
        }
        self.0
            .checked_mul(Decimal::from(quantity))
            .map(Self)
            .ok_or(PriceError::Overflow)
    }

    /// Exact addition.
    ///
    /// # Errors
    ///
    /// Returns an error if the addition overflows.
    pub fn checked_add(self, other: Self) -> Result<Self, PriceError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(PriceError::Overflow)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// SQLx support: NUMERIC column <-> Decimal (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert_eq!(Price::parse("10.50").unwrap().to_string(), "10.50");
        assert_eq!(Price::parse("0").unwrap(), Price::ZERO);
        assert_eq!(Price::parse(" 4.99 ").unwrap().to_string(), "4.99");
    }

    #[test]
    fn test_parse_rejects() {
        assert!(matches!(Price::parse("abc"), Err(PriceError::Invalid(_))));
        assert!(matches!(Price::parse("-1.00"), Err(PriceError::Negative)));
        assert!(matches!(Price::parse("1.999"), Err(PriceError::TooPrecise)));
    }

    #[test]
    fn test_line_total_exact() {
        let price = Price::parse("10.50").unwrap();
        assert_eq!(price.line_total(2).unwrap().to_string(), "21.00");
    }

    #[test]
    fn test_line_total_rejects_zero_quantity() {
        let price = Price::parse("1.00").unwrap();
        assert!(matches!(
            price.line_total(0),
            Err(PriceError::InvalidQuantity)
        ));
    }

    #[test]
    fn test_sum_has_no_float_drift() {
        // 10.50 * 2 + 4.99 * 1 = 25.99, exactly.
        let total = Price::parse("10.50")
            .unwrap()
            .line_total(2)
            .unwrap()
            .checked_add(Price::parse("4.99").unwrap().line_total(1).unwrap())
            .unwrap();
        assert_eq!(total.to_string(), "25.99");
    }

    #[test]
    fn test_serde_string_form() {
        let price = Price::parse("25.99").unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "\"25.99\"");

        let parsed: Price = serde_json::from_str("\"25.99\"").unwrap();
        assert_eq!(parsed, price);
    }
}
