use super::{now_ms, to_cents, Repository};
use crate::domain::{Money, UserId};
use crate::engine::{BalanceLedger, LedgerError};
use async_trait::async_trait;
use sqlx::Row;
use tracing::debug;

fn cents(amount: Money) -> Result<i64, LedgerError> {
    if amount.is_negative() {
        return Err(LedgerError::NegativeAmount(amount));
    }
    to_cents(amount).map_err(LedgerError::Storage)
}

impl Repository {
    async fn balance_cents(&self, user: &UserId) -> Result<Option<i64>, sqlx::Error> {
        let row = sqlx::query("SELECT balance_cents FROM balances WHERE user_id = ?")
            .bind(user.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get::<i64, _>("balance_cents")))
    }
}

#[async_trait]
impl BalanceLedger for Repository {
    async fn open_account(&self, user: &UserId, initial: Money) -> Result<Money, LedgerError> {
        let initial_cents = cents(initial)?;
        let result = sqlx::query(
            r#"
            INSERT INTO balances (user_id, balance_cents, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(user_id) DO NOTHING
            "#,
        )
        .bind(user.as_str())
        .bind(initial_cents)
        .bind(now_ms())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            debug!(user = %user, balance = %initial, "Opened balance account");
        }

        let current = self
            .balance_cents(user)
            .await?
            .ok_or_else(|| LedgerError::UnknownAccount(user.clone()))?;
        Ok(Money::from_minor_units(current))
    }

    async fn balance(&self, user: &UserId) -> Result<Option<Money>, LedgerError> {
        Ok(self.balance_cents(user).await?.map(Money::from_minor_units))
    }

    async fn debit(&self, user: &UserId, amount: Money) -> Result<Money, LedgerError> {
        let amount_cents = cents(amount)?;

        // Check and subtract in one statement; no row means the guard failed.
        let row = sqlx::query(
            r#"
            UPDATE balances
            SET balance_cents = balance_cents - ?, updated_at = ?
            WHERE user_id = ? AND balance_cents >= ?
            RETURNING balance_cents
            "#,
        )
        .bind(amount_cents)
        .bind(now_ms())
        .bind(user.as_str())
        .bind(amount_cents)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Money::from_minor_units(row.get("balance_cents"))),
            None => match self.balance_cents(user).await? {
                Some(available) => Err(LedgerError::InsufficientFunds {
                    required: amount,
                    available: Money::from_minor_units(available),
                }),
                None => Err(LedgerError::UnknownAccount(user.clone())),
            },
        }
    }

    async fn credit(&self, user: &UserId, amount: Money) -> Result<Money, LedgerError> {
        let amount_cents = cents(amount)?;
        let row = sqlx::query(
            r#"
            UPDATE balances
            SET balance_cents = balance_cents + ?, updated_at = ?
            WHERE user_id = ?
            RETURNING balance_cents
            "#,
        )
        .bind(amount_cents)
        .bind(now_ms())
        .bind(user.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| Money::from_minor_units(r.get("balance_cents")))
            .ok_or_else(|| LedgerError::UnknownAccount(user.clone()))
    }
}
