//! One-time login code type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`OneTimeCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OneTimeCodeError {
    /// The code is not exactly six characters.
    #[error("code must be exactly {len} digits", len = OneTimeCode::LENGTH)]
    WrongLength,
    /// The code contains a non-digit character.
    #[error("code must contain only digits")]
    NotDigits,
}

/// A six-digit one-time login code.
///
/// Only the shape is validated here; issuance, expiry, and single-use
/// bookkeeping live with the OTP store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct OneTimeCode(String);

impl OneTimeCode {
    /// Number of digits in a code.
    pub const LENGTH: usize = 6;

    /// Parse a code, requiring exactly six ASCII digits.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not exactly six ASCII digits.
    pub fn parse(s: &str) -> Result<Self, OneTimeCodeError> {
        if s.len() != Self::LENGTH {
            return Err(OneTimeCodeError::WrongLength);
        }
        if !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(OneTimeCodeError::NotDigits);
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OneTimeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for OneTimeCode {
    type Err = OneTimeCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for OneTimeCode {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for OneTimeCode {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for OneTimeCode {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert_eq!(OneTimeCode::parse("042317").unwrap().as_str(), "042317");
    }

    #[test]
    fn test_parse_wrong_length() {
        assert_eq!(
            OneTimeCode::parse("12345"),
            Err(OneTimeCodeError::WrongLength)
        );
        assert_eq!(
            OneTimeCode::parse("1234567"),
            Err(OneTimeCodeError::WrongLength)
        );
    }

    #[test]
    fn test_parse_non_digits() {
        assert_eq!(
            OneTimeCode::parse("12a456"),
            Err(OneTimeCodeError::NotDigits)
        );
    }
}
