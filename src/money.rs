//! Monetary amounts with 2 decimal places precision.
//!
//! Uses `rust_decimal` internally with scale enforcement so batch sums are
//! exact after cent rounding, with no floating-point drift.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

/// A currency amount that maintains exactly 2 decimal places.
///
/// Values are rounded half away from zero on construction, which is how
/// amounts are rounded before they are written as implicit-decimal integers.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use cnab240_encoder::Money;
///
/// let amount = Money::from_str("10.005").unwrap();
/// assert_eq!(amount.to_string(), "10.01");
/// assert_eq!(amount.cents(), Some(1001));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Money(Decimal);

impl Money {
    /// The number of decimal places to maintain.
    pub const SCALE: u32 = 2;

    /// Zero value.
    pub const ZERO: Self = Money(Decimal::ZERO);

    /// Creates a new `Money` from a `Decimal`, rounding to 2 decimal places.
    pub fn new(value: Decimal) -> Self {
        let mut rounded = value.round_dp_with_strategy(Self::SCALE, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(Self::SCALE);
        Money(rounded)
    }

    /// Creates an amount from an integer number of cents.
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, Self::SCALE))
    }

    /// Returns the underlying decimal value.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Returns the amount as an integer number of cents, or `None` when it
    /// does not fit in an `i64`.
    pub fn cents(&self) -> Option<i64> {
        self.0.checked_mul(Decimal::ONE_HUNDRED)?.to_i64()
    }

    /// Returns `true` if this value is below zero.
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Money::new(value)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let decimal = Decimal::from_str(s.trim())?;
        Ok(Money::new(decimal))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Money::new(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
        self.0.rescale(Self::SCALE);
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Money::new(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{:.2}", self.0))
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Accepts JSON numbers as well as strings such as "1500.10".
        let decimal = <Decimal as Deserialize>::deserialize(deserializer)?;
        Ok(Money::new(decimal))
    }
}
