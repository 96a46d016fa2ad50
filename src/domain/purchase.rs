//! Recorded purchases and the draft handed to the recorder.

use crate::domain::{CartLine, Money, PurchaseId, ShippingDetails, UserId};
use crate::engine::TaxBreakdown;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Everything the recorder needs to persist a purchase.
///
/// `lines` is an owned snapshot; the cart may change after the draft is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseDraft {
    pub user_id: UserId,
    pub lines: Vec<CartLine>,
    pub breakdown: TaxBreakdown,
    pub shipping_details: ShippingDetails,
    pub created_at: DateTime<Utc>,
}

impl PurchaseDraft {
    pub fn new(
        user_id: UserId,
        lines: Vec<CartLine>,
        breakdown: TaxBreakdown,
        shipping_details: ShippingDetails,
    ) -> Self {
        Self {
            user_id,
            lines,
            breakdown,
            shipping_details,
            // Millisecond precision, matching what storage keeps.
            created_at: Utc::now().trunc_subsecs(3),
        }
    }

    /// Materialize the immutable record once an id has been assigned.
    pub fn into_purchase(self, id: PurchaseId) -> Purchase {
        Purchase {
            id,
            user_id: self.user_id,
            lines: self.lines,
            subtotal: self.breakdown.subtotal,
            sales_tax: self.breakdown.sales_tax,
            luxury_tax: self.breakdown.luxury_tax,
            shipping: self.breakdown.shipping,
            total: self.breakdown.total,
            shipping_details: self.shipping_details,
            created_at: self.created_at,
        }
    }
}

/// An immutable, self-contained purchase record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: PurchaseId,
    pub user_id: UserId,
    pub lines: Vec<CartLine>,
    pub subtotal: Money,
    pub sales_tax: Money,
    pub luxury_tax: Money,
    pub shipping: Money,
    pub total: Money,
    pub shipping_details: ShippingDetails,
    pub created_at: DateTime<Utc>,
}

impl Purchase {
    pub fn breakdown(&self) -> TaxBreakdown {
        TaxBreakdown {
            subtotal: self.subtotal,
            sales_tax: self.sales_tax,
            luxury_tax: self.luxury_tax,
            shipping: self.shipping,
            total: self.total,
        }
    }
}
