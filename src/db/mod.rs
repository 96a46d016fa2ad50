//! SQLite persistence for balances and purchases.
//!
//! This module provides:
//! - Database initialization and migrations
//! - The `Repository`, which implements both `BalanceLedger` and `PurchaseRecorder`

pub mod migrations;
pub mod repo;

pub use migrations::init_db;
pub use repo::Repository;
