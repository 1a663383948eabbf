//! Fixed-precision decimal value objects for prices and stock quantities.
//!
//! Every amount is held as a `rust_decimal::Decimal` rounded to
//! [`SCALE`] fractional digits (half away from zero) at construction, so
//! repeated price increases and decays never accumulate drift.

use core::ops::{Add, Mul, Neg, Sub};
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_object::ValueObject;

/// Number of fractional digits carried by [`Money`] and [`Quantity`].
pub const SCALE: u32 = 4;

fn normalize(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// A unit price or monetary total.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

/// A stock quantity or quantity delta.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "Decimal", into = "Decimal")]
pub struct Quantity(Decimal);

macro_rules! impl_decimal_value {
    ($t:ident, $name:literal) => {
        impl $t {
            pub const ZERO: $t = $t(Decimal::ZERO);

            pub fn new(value: Decimal) -> Self {
                Self(normalize(value))
            }

            pub fn as_decimal(&self) -> Decimal {
                self.0
            }

            pub fn is_zero(&self) -> bool {
                self.0.is_zero()
            }

            /// Strictly greater than zero.
            pub fn is_positive(&self) -> bool {
                self.0 > Decimal::ZERO
            }

            /// Strictly less than zero.
            pub fn is_negative(&self) -> bool {
                self.0 < Decimal::ZERO
            }
        }

        impl ValueObject for $t {}

        impl From<Decimal> for $t {
            fn from(value: Decimal) -> Self {
                Self::new(value)
            }
        }

        impl From<$t> for Decimal {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl From<i64> for $t {
            fn from(value: i64) -> Self {
                Self(Decimal::from(value))
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = Decimal::from_str(s.trim())
                    .map_err(|e| DomainError::invalid(format!("{}: {}", $name, e)))?;
                Ok(Self::new(value))
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{:.4}", self.0)
            }
        }

        impl Add for $t {
            type Output = $t;

            fn add(self, rhs: $t) -> $t {
                Self::new(self.0 + rhs.0)
            }
        }

        impl Sub for $t {
            type Output = $t;

            fn sub(self, rhs: $t) -> $t {
                Self::new(self.0 - rhs.0)
            }
        }

        impl Neg for $t {
            type Output = $t;

            fn neg(self) -> $t {
                Self(-self.0)
            }
        }

        impl core::iter::Sum for $t {
            fn sum<I: Iterator<Item = $t>>(iter: I) -> $t {
                iter.fold($t::ZERO, |acc, x| acc + x)
            }
        }
    };
}

impl_decimal_value!(Money, "Money");
impl_decimal_value!(Quantity, "Quantity");

/// Line total: quantity × unit price.
impl Mul<Money> for Quantity {
    type Output = Money;

    fn mul(self, rhs: Money) -> Money {
        Money::new(self.0 * rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_rounds_to_four_places() {
        let m = Money::new(Decimal::new(123_456_789, 7)); // 12.3456789
        assert_eq!(m.as_decimal(), Decimal::new(123_457, 4));
        assert_eq!(m.to_string(), "12.3457");
    }

    #[test]
    fn midpoint_rounds_away_from_zero() {
        let m = Money::new(Decimal::new(5, 5)); // 0.00005
        assert_eq!(m.as_decimal(), Decimal::new(1, 4));
    }

    #[test]
    fn display_always_carries_four_digits() {
        assert_eq!(Money::from(10).to_string(), "10.0000");
        assert_eq!(Quantity::ZERO.to_string(), "0.0000");
    }

    #[test]
    fn line_total_multiplies_quantity_by_price() {
        let total = Quantity::from(2) * Money::from(10);
        assert_eq!(total, Money::from(20));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            "ten".parse::<Quantity>(),
            Err(DomainError::InvalidArgument(_))
        ));
        assert_eq!(" 2.5 ".parse::<Money>().unwrap(), Money::new(Decimal::new(25, 1)));
    }

    #[test]
    fn serde_uses_decimal_strings() {
        let m: Money = serde_json::from_str("\"1.23456\"").unwrap();
        assert_eq!(m.as_decimal(), Decimal::new(12346, 4));
        let json = serde_json::to_string(&Money::new(Decimal::new(25, 1))).unwrap();
        assert_eq!(json, "\"2.5\"");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: repeated add/sub of the same step returns to the start (no drift).
            #[test]
            fn add_then_sub_has_no_drift(
                start in 0i64..1_000_000,
                step in 1i64..100_000,
                n in 1usize..50,
            ) {
                let start = Money::new(Decimal::new(start, 4));
                let step = Money::new(Decimal::new(step, 4));
                let mut price = start;
                for _ in 0..n { price = price + step; }
                for _ in 0..n { price = price - step; }
                prop_assert_eq!(price, start);
            }
        }
    }
}
