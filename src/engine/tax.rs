//! Sales tax and per-line luxury surtax.

use crate::domain::{CartLine, ItemId, Money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rates and threshold applied at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxPolicy {
    pub sales_tax_rate: Decimal,
    pub luxury_tax_rate: Decimal,
    /// A line is surtaxed when its extended price is strictly above this.
    pub luxury_threshold: Money,
}

impl TaxPolicy {
    pub const DEFAULT_SALES_TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);
    pub const DEFAULT_LUXURY_TAX_RATE: Decimal = Decimal::from_parts(2, 0, 0, false, 2);
    pub const DEFAULT_LUXURY_THRESHOLD_UNITS: i64 = 1000;
}

impl Default for TaxPolicy {
    fn default() -> Self {
        Self {
            sales_tax_rate: Self::DEFAULT_SALES_TAX_RATE,
            luxury_tax_rate: Self::DEFAULT_LUXURY_TAX_RATE,
            luxury_threshold: Money::from_units(Self::DEFAULT_LUXURY_THRESHOLD_UNITS),
        }
    }
}

/// Derived totals for a set of cart lines. Never persisted on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBreakdown {
    pub subtotal: Money,
    pub sales_tax: Money,
    pub luxury_tax: Money,
    /// Always zero: shipping is free.
    pub shipping: Money,
    pub total: Money,
}

/// Contract violations in cart construction. Not user-recoverable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaxError {
    #[error("invalid input: no cart lines")]
    NoLines,
    #[error("invalid input: negative unit price for item {0}")]
    NegativePrice(ItemId),
    #[error("invalid input: non-positive quantity for item {0}")]
    NonPositiveQuantity(ItemId),
}

/// Compute taxes with the default policy.
pub fn compute_taxes(lines: &[CartLine]) -> Result<TaxBreakdown, TaxError> {
    TaxCalculator::default().compute(lines)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TaxCalculator {
    policy: TaxPolicy,
}

impl TaxCalculator {
    pub fn new(policy: TaxPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &TaxPolicy {
        &self.policy
    }

    /// Pure and deterministic.
    ///
    /// Each tax component is rounded to cents before summing, so `total` is
    /// exactly `subtotal + sales_tax + luxury_tax + shipping`.
    pub fn compute(&self, lines: &[CartLine]) -> Result<TaxBreakdown, TaxError> {
        if lines.is_empty() {
            return Err(TaxError::NoLines);
        }

        let mut subtotal = Money::zero();
        let mut luxury_base = Money::zero();
        for line in lines {
            if line.unit_price.is_negative() {
                return Err(TaxError::NegativePrice(line.item_id.clone()));
            }
            if line.quantity == 0 {
                return Err(TaxError::NonPositiveQuantity(line.item_id.clone()));
            }

            let extended = line.extended_price();
            subtotal += extended;
            // Per line, never on the aggregate.
            if extended > self.policy.luxury_threshold {
                luxury_base += extended;
            }
        }

        let subtotal = subtotal.round_to_cents();
        let sales_tax = subtotal.times_rate(self.policy.sales_tax_rate).round_to_cents();
        let luxury_tax = luxury_base
            .times_rate(self.policy.luxury_tax_rate)
            .round_to_cents();
        let shipping = Money::zero();

        Ok(TaxBreakdown {
            subtotal,
            sales_tax,
            luxury_tax,
            shipping,
            total: subtotal + sales_tax + luxury_tax + shipping,
        })
    }
}
