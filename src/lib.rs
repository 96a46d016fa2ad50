pub mod api;
pub mod catalog;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;
pub mod recorder;

pub use catalog::{CatalogError, CatalogSource, ItemFilter, MockCatalogSource, StaticCatalog};
pub use config::Config;
pub use db::{init_db, Repository};
pub use domain::{
    Cart, CartLine, Category, Item, ItemId, Money, Purchase, PurchaseId, ShippingDetails, UserId,
};
pub use engine::{BalanceLedger, InMemoryLedger, LedgerError, TaxBreakdown, TaxCalculator, TaxPolicy};
pub use error::AppError;
pub use orchestration::{CheckoutState, Settlement, SettlementError, SettlementOrchestrator};
pub use recorder::{MockPurchaseRecorder, PersistenceError, PurchasePage, PurchaseRecorder};
