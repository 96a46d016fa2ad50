//! Pricing and balance logic used by settlement.

pub mod ledger;
pub mod tax;

pub use ledger::{BalanceLedger, InMemoryLedger, LedgerError};
pub use tax::{compute_taxes, TaxBreakdown, TaxCalculator, TaxError, TaxPolicy};
