//! Cart aggregate and its lines.

use crate::domain::{Category, Item, ItemId, Money};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One catalog item plus quantity held for purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub item_id: ItemId,
    pub title: String,
    pub category: Category,
    pub unit_price: Money,
    pub quantity: u32,
}

impl CartLine {
    pub fn new(item: &Item, quantity: u32) -> Self {
        Self {
            item_id: item.id.clone(),
            title: item.title.clone(),
            category: item.category,
            unit_price: item.price,
            quantity,
        }
    }

    /// `unit_price × quantity`.
    pub fn extended_price(&self) -> Money {
        self.unit_price.times_quantity(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("quantity must be at least 1")]
    ZeroQuantity,
    #[error("quantity overflow for item {0}")]
    QuantityOverflow(ItemId),
    #[error("item {0} is not in the cart")]
    NotInCart(ItemId),
}

/// Per-session cart. Lines are kept in insertion order, one line per item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` of `item`, merging with an existing line.
    ///
    /// The line keeps the price of the first add; re-pricing happens by
    /// removing and re-adding.
    pub fn add(&mut self, item: &Item, quantity: u32) -> Result<&CartLine, CartError> {
        if quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }

        let idx = match self.lines.iter().position(|l| l.item_id == item.id) {
            Some(idx) => {
                let line = &mut self.lines[idx];
                line.quantity = line
                    .quantity
                    .checked_add(quantity)
                    .ok_or_else(|| CartError::QuantityOverflow(item.id.clone()))?;
                idx
            }
            None => {
                self.lines.push(CartLine::new(item, quantity));
                self.lines.len() - 1
            }
        };

        Ok(&self.lines[idx])
    }

    /// Overwrite the quantity of an existing line.
    pub fn set_quantity(&mut self, item_id: &ItemId, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }
        let line = self
            .lines
            .iter_mut()
            .find(|l| &l.item_id == item_id)
            .ok_or_else(|| CartError::NotInCart(item_id.clone()))?;
        line.quantity = quantity;
        Ok(())
    }

    pub fn remove(&mut self, item_id: &ItemId) -> Result<CartLine, CartError> {
        let idx = self
            .lines
            .iter()
            .position(|l| &l.item_id == item_id)
            .ok_or_else(|| CartError::NotInCart(item_id.clone()))?;
        Ok(self.lines.remove(idx))
    }

    /// Take settled quantities out of the cart.
    ///
    /// Lines added after the snapshot was taken stay; a line whose quantity
    /// reaches zero is dropped.
    pub fn remove_settled(&mut self, settled: &[CartLine]) {
        for done in settled {
            if let Some(line) = self.lines.iter_mut().find(|l| l.item_id == done.item_id) {
                line.quantity = line.quantity.saturating_sub(done.quantity);
            }
        }
        self.lines.retain(|l| l.quantity > 0);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Owned copy of the lines, detached from later cart changes.
    pub fn snapshot(&self) -> Vec<CartLine> {
        self.lines.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::extended_price).sum()
    }
}
