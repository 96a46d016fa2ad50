//! Fixed-point money type backed by rust_decimal.
//!
//! Amounts are exact decimals in memory and integer minor units (cents) at rest.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::str::FromStr;

/// Number of decimal places kept for stored and reported amounts.
pub const MINOR_UNIT_SCALE: u32 = 2;

/// Exact monetary amount.
///
/// Serializes to a JSON string so clients never see a float.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Money(#[serde(with = "rust_decimal::serde::str")] Decimal);

impl Money {
    pub fn new(value: Decimal) -> Self {
        Money(value)
    }

    /// Whole monetary units, e.g. `Money::from_units(1200)` is 1200.00.
    pub fn from_units(units: i64) -> Self {
        Money(Decimal::from(units))
    }

    /// Build an amount from integer minor units (cents).
    pub fn from_minor_units(cents: i64) -> Self {
        Money(Decimal::new(cents, MINOR_UNIT_SCALE))
    }

    /// Convert to integer minor units, rounding sub-cent remainders.
    ///
    /// Returns `None` if the amount does not fit in an `i64`.
    pub fn to_minor_units(&self) -> Option<i64> {
        (self.round_to_cents().0 * Decimal::ONE_HUNDRED).to_i64()
    }

    /// Parse an amount from a decimal string.
    ///
    /// # Errors
    /// Returns an error if the string is not a valid decimal number.
    pub fn from_str_canonical(s: &str) -> Result<Self, rust_decimal::Error> {
        Decimal::from_str(s.trim()).map(Money)
    }

    /// Canonical string: two decimal places, no exponent.
    pub fn to_canonical_string(&self) -> String {
        let mut rounded = self.round_to_cents().0;
        rounded.rescale(MINOR_UNIT_SCALE);
        rounded.to_string()
    }

    /// Round to whole cents, midpoint away from zero.
    pub fn round_to_cents(&self) -> Self {
        Money(
            self.0
                .round_dp_with_strategy(MINOR_UNIT_SCALE, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    pub fn inner(&self) -> Decimal {
        self.0
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the value is < 0.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    /// Multiply by a plain rate such as `0.08`.
    pub fn times_rate(&self, rate: Decimal) -> Self {
        Money(self.0 * rate)
    }

    /// Multiply by an item count.
    pub fn times_quantity(&self, quantity: u32) -> Self {
        Money(self.0 * Decimal::from(quantity))
    }

    pub fn checked_sub(&self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_canonical(s)
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Money(value)
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}
