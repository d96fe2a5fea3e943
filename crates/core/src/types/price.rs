//! Type-safe price representation using decimal arithmetic.
//!
//! Forgeline sells in a single market, so prices carry no currency tag:
//! every amount is Pakistani Rupees (PKR). Arithmetic stays in
//! [`rust_decimal::Decimal`] to avoid float drift in order totals.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PriceError {
    /// The input could not be parsed as a decimal number.
    #[error("price is not a valid decimal number")]
    Invalid,
    /// Prices are never negative.
    #[error("price cannot be negative")]
    Negative,
}

/// An amount of money in Pakistani Rupees.
///
/// ## Examples
///
/// ```
/// use forgeline_core::Price;
///
/// let unit = Price::from_rupees(2600);
/// let subtotal = unit.times(2);
/// assert_eq!(subtotal, Price::from_rupees(5200));
/// assert_eq!(subtotal.to_string(), "Rs 5,200");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero rupees.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] for amounts below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount))
    }

    /// Create a price from a whole number of rupees.
    #[must_use]
    pub fn from_rupees(rupees: u32) -> Self {
        Self(Decimal::from(rupees))
    }

    /// Parse a price from a decimal string such as `"2600"` or `"2600.50"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a decimal number or is negative.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount: Decimal = s.trim().parse().map_err(|_| PriceError::Invalid)?;
        Self::new(amount)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply by a line-item quantity.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Whether this price is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Price {
    /// Formats as `Rs 5,200` (or `Rs 5,200.50` when the amount has
    /// a fractional part), matching the storefront's price strings.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.0.round_dp(2);
        let formatted = if rounded.fract().is_zero() {
            format!("{}", rounded.trunc())
        } else {
            format!("{rounded:.2}")
        };

        // Insert thousands separators into the integer part.
        let (int_part, frac_part) = match formatted.split_once('.') {
            Some((i, frac)) => (i, Some(frac)),
            None => (formatted.as_str(), None),
        };

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        let digits: Vec<char> = int_part.chars().collect();
        for (i, c) in digits.iter().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(*c);
        }

        match frac_part {
            Some(frac) => write!(f, "Rs {grouped}.{frac}"),
            None => write!(f, "Rs {grouped}"),
        }
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Price {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

// SQLx support (with postgres feature): stored as NUMERIC
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
    fn test_from_rupees() {
        assert_eq!(Price::from_rupees(2600).amount(), Decimal::from(2600));
    }

    #[test]
    fn test_negative_rejected() {
        assert!(matches!(
            Price::new(Decimal::from(-1)),
            Err(PriceError::Negative)
        ));
        assert!(matches!(Price::parse("-50"), Err(PriceError::Negative)));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(Price::parse("abc"), Err(PriceError::Invalid)));
    }

    #[test]
    fn test_times() {
        let unit = Price::from_rupees(2600);
        assert_eq!(unit.times(2), Price::from_rupees(5200));
        assert_eq!(unit.times(0), Price::ZERO);
    }

    #[test]
    fn test_sum() {
        let total: Price = [Price::from_rupees(1200), Price::from_rupees(800)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_rupees(2000));
    }

    #[test]
    fn test_ordering_for_thresholds() {
        assert!(Price::from_rupees(5000) >= Price::from_rupees(5000));
        assert!(Price::from_rupees(4999) < Price::from_rupees(5000));
    }

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Price::from_rupees(999).to_string(), "Rs 999");
        assert_eq!(Price::from_rupees(5200).to_string(), "Rs 5,200");
        assert_eq!(Price::from_rupees(1_250_000).to_string(), "Rs 1,250,000");
    }

    #[test]
    fn test_display_fractional() {
        let price = Price::parse("2600.50").unwrap();
        assert_eq!(price.to_string(), "Rs 2,600.50");
    }

    #[test]
    fn test_serde_roundtrip() {
        let price = Price::from_rupees(200);
        let json = serde_json::to_string(&price).unwrap();
        let back: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(back, price);
    }
}
