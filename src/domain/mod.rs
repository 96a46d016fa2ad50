//! Domain types for the checkout core.
//!
//! This module provides:
//! - Exact money handling via the Money wrapper
//! - Identifiers: UserId, ItemId, PurchaseId
//! - Catalog item shape, cart aggregate, shipping details and purchase records

pub mod cart;
pub mod item;
pub mod money;
pub mod primitives;
pub mod purchase;
pub mod shipping;

pub use cart::{Cart, CartError, CartLine};
pub use item::{Category, Item, UnknownCategory};
pub use money::Money;
pub use primitives::{ItemId, PurchaseId, UserId};
pub use purchase::{Purchase, PurchaseDraft};
pub use shipping::{ShippingDetails, ShippingErrors};
