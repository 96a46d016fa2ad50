//! Per-user spending balance with atomic conditional debit.

use crate::domain::{Money, UserId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: Money, available: Money },
    #[error("no balance account for user {0}")]
    UnknownAccount(UserId),
    #[error("amount must not be negative: {0}")]
    NegativeAmount(Money),
    #[error("ledger storage error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        LedgerError::Storage(err.to_string())
    }
}

/// Balance store used by settlement.
///
/// `debit` must check and subtract as one step with respect to every other
/// `debit`/`credit` on the same user, and must leave the balance untouched
/// when it fails. Balances are never observed below zero.
#[async_trait]
pub trait BalanceLedger: Send + Sync + fmt::Debug {
    /// Create the account with `initial` if it does not exist yet.
    ///
    /// Returns the current balance; an existing account keeps its balance.
    async fn open_account(&self, user: &UserId, initial: Money) -> Result<Money, LedgerError>;

    async fn balance(&self, user: &UserId) -> Result<Option<Money>, LedgerError>;

    /// Subtract `amount` if it is covered. Returns the new balance.
    async fn debit(&self, user: &UserId, amount: Money) -> Result<Money, LedgerError>;

    /// Add `amount` back. Only used to reverse a prior debit.
    async fn credit(&self, user: &UserId, amount: Money) -> Result<Money, LedgerError>;
}

fn ensure_non_negative(amount: Money) -> Result<(), LedgerError> {
    if amount.is_negative() {
        Err(LedgerError::NegativeAmount(amount))
    } else {
        Ok(())
    }
}

/// Ledger kept in process memory. One lock covers every account.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    balances: Mutex<HashMap<UserId, Money>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an account, replacing any existing balance.
    pub async fn with_balance(self, user: &UserId, amount: Money) -> Self {
        self.balances.lock().await.insert(user.clone(), amount);
        self
    }
}

#[async_trait]
impl BalanceLedger for InMemoryLedger {
    async fn open_account(&self, user: &UserId, initial: Money) -> Result<Money, LedgerError> {
        ensure_non_negative(initial)?;
        let mut balances = self.balances.lock().await;
        Ok(*balances.entry(user.clone()).or_insert(initial))
    }

    async fn balance(&self, user: &UserId) -> Result<Option<Money>, LedgerError> {
        Ok(self.balances.lock().await.get(user).copied())
    }

    async fn debit(&self, user: &UserId, amount: Money) -> Result<Money, LedgerError> {
        ensure_non_negative(amount)?;
        let mut balances = self.balances.lock().await;
        let balance = balances
            .get_mut(user)
            .ok_or_else(|| LedgerError::UnknownAccount(user.clone()))?;

        if amount > *balance {
            return Err(LedgerError::InsufficientFunds {
                required: amount,
                available: *balance,
            });
        }
        *balance = *balance - amount;
        Ok(*balance)
    }

    async fn credit(&self, user: &UserId, amount: Money) -> Result<Money, LedgerError> {
        ensure_non_negative(amount)?;
        let mut balances = self.balances.lock().await;
        let balance = balances
            .get_mut(user)
            .ok_or_else(|| LedgerError::UnknownAccount(user.clone()))?;
        *balance += amount;
        Ok(*balance)
    }
}
