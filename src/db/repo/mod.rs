//! Repository layer for database operations.
//!
//! This module provides the `Repository` struct for all database operations.
//! Methods are organized across submodules by domain:
//! - `balances.rs` - Balance ledger (atomic conditional debit, credit)
//! - `purchases.rs` - Purchase recording and history

mod balances;
mod purchases;

use crate::domain::Money;
use sqlx::sqlite::SqlitePool;

/// Repository for database operations.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Amounts are stored as integer cents.
fn to_cents(amount: Money) -> Result<i64, String> {
    amount
        .to_minor_units()
        .ok_or_else(|| format!("amount {} does not fit in cents storage", amount))
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
