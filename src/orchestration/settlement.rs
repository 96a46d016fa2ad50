//! Checkout settlement: price, debit, record, and compensate on failure.

use crate::config::Config;
use crate::domain::{CartLine, Money, PurchaseDraft, PurchaseId, ShippingDetails, ShippingErrors, UserId};
use crate::engine::{BalanceLedger, LedgerError, TaxBreakdown, TaxCalculator, TaxError};
use crate::orchestration::session::{CheckoutState, SessionRegistry, UserSession};
use crate::recorder::PurchaseRecorder;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum SettlementError {
    #[error(transparent)]
    InvalidShipping(ShippingErrors),
    #[error("shipping details have not been collected")]
    ShippingNotCollected,
    #[error("cart is empty")]
    EmptyCart,
    /// Cart lines broke a pricing precondition; a bug upstream of checkout.
    #[error("cart contents are invalid: {0}")]
    InvalidCart(TaxError),
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: Money, available: Money },
    /// The ledger could not be reached. Nothing was debited.
    #[error("balance ledger unavailable: {0}")]
    Ledger(LedgerError),
    /// Recording failed after the debit. `rolled_back` is false only when the
    /// compensating credit itself could not be applied.
    #[error("purchase could not be recorded: {message}")]
    Persistence { message: String, rolled_back: bool },
    #[error("settlement task failed: {0}")]
    Internal(String),
}

/// A completed checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    pub purchase_id: PurchaseId,
    pub breakdown: TaxBreakdown,
    /// Balance right after the debit.
    pub balance: Money,
}

#[derive(Debug, Clone)]
pub struct SettlementOrchestrator {
    ledger: Arc<dyn BalanceLedger>,
    recorder: Arc<dyn PurchaseRecorder>,
    sessions: Arc<SessionRegistry>,
    calculator: TaxCalculator,
    initial_balance: Money,
    rollback_max_elapsed: Duration,
}

impl SettlementOrchestrator {
    pub fn new(
        ledger: Arc<dyn BalanceLedger>,
        recorder: Arc<dyn PurchaseRecorder>,
        config: &Config,
    ) -> Self {
        Self {
            ledger,
            recorder,
            sessions: Arc::new(SessionRegistry::new()),
            calculator: TaxCalculator::new(config.tax_policy),
            initial_balance: config.initial_balance,
            rollback_max_elapsed: config.rollback_max_elapsed,
        }
    }

    /// Upper bound on retrying a compensating credit.
    pub fn with_rollback_max_elapsed(mut self, max_elapsed: Duration) -> Self {
        self.rollback_max_elapsed = max_elapsed;
        self
    }

    pub fn ledger(&self) -> &Arc<dyn BalanceLedger> {
        &self.ledger
    }

    pub fn recorder(&self) -> &Arc<dyn PurchaseRecorder> {
        &self.recorder
    }

    /// The user's session, created on first use. For mutations only.
    pub async fn session(&self, user: &UserId) -> Arc<UserSession> {
        self.sessions.get_or_create(user).await
    }

    /// The user's session if one exists.
    pub async fn existing_session(&self, user: &UserId) -> Option<Arc<UserSession>> {
        self.sessions.get(user).await
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.len().await
    }

    /// Open the user's balance with the configured initial amount on first sight.
    pub async fn ensure_account(&self, user: &UserId) -> Result<Money, LedgerError> {
        self.ledger.open_account(user, self.initial_balance).await
    }

    pub async fn checkout_state(&self, user: &UserId) -> CheckoutState {
        match self.existing_session(user).await {
            Some(session) => session.progress().await.state,
            None => CheckoutState::Idle,
        }
    }

    /// Validate and remember shipping details for a later `checkout_collected`.
    ///
    /// Waits for any in-flight settlement so its state is never overwritten.
    pub async fn collect_shipping(
        &self,
        user: &UserId,
        details: ShippingDetails,
    ) -> Result<CheckoutState, SettlementError> {
        let session = self.session(user).await;
        let _settling = session.lock_settlement().await;
        apply_shipping(&session, details).await
    }

    /// Order summary for the current cart.
    pub async fn quote(&self, user: &UserId) -> Result<TaxBreakdown, SettlementError> {
        let lines = match self.existing_session(user).await {
            Some(session) => session.cart().await.snapshot(),
            None => Vec::new(),
        };
        if lines.is_empty() {
            return Err(SettlementError::EmptyCart);
        }
        self.calculator
            .compute(&lines)
            .map_err(SettlementError::InvalidCart)
    }

    /// Settle explicit `lines` for `user`.
    ///
    /// On success the settled quantities are taken out of the user's cart.
    pub async fn settle(
        &self,
        user: &UserId,
        lines: Vec<CartLine>,
        shipping: ShippingDetails,
    ) -> Result<Settlement, SettlementError> {
        self.run(user, Some(lines), shipping).await
    }

    /// Settle whatever is in the user's cart once the settlement lock is held.
    ///
    /// A resubmit queued behind a successful attempt sees an empty cart.
    pub async fn checkout(
        &self,
        user: &UserId,
        shipping: ShippingDetails,
    ) -> Result<Settlement, SettlementError> {
        self.run(user, None, shipping).await
    }

    /// `checkout` with the shipping details stored by `collect_shipping`.
    pub async fn checkout_collected(&self, user: &UserId) -> Result<Settlement, SettlementError> {
        let session = self
            .existing_session(user)
            .await
            .ok_or(SettlementError::ShippingNotCollected)?;
        let shipping = session
            .progress()
            .await
            .shipping
            .clone()
            .ok_or(SettlementError::ShippingNotCollected)?;
        self.run(user, None, shipping).await
    }

    async fn run(
        &self,
        user: &UserId,
        lines: Option<Vec<CartLine>>,
        shipping: ShippingDetails,
    ) -> Result<Settlement, SettlementError> {
        let attempt = Attempt {
            user: user.clone(),
            session: self.session(user).await,
            lines,
            shipping,
            ledger: self.ledger.clone(),
            recorder: self.recorder.clone(),
            calculator: self.calculator,
            initial_balance: self.initial_balance,
            rollback_max_elapsed: self.rollback_max_elapsed,
        };

        // Detached so a dropped caller cannot leave a debit without its
        // purchase or its reversal.
        tokio::spawn(attempt.run())
            .await
            .map_err(|e| SettlementError::Internal(e.to_string()))?
    }
}

/// Store valid details and move to `ShippingCollected`; invalid details clear
/// what was stored. Callers hold the settlement lock.
async fn apply_shipping(
    session: &UserSession,
    details: ShippingDetails,
) -> Result<CheckoutState, SettlementError> {
    let mut progress = session.progress().await;
    match details.validate() {
        Ok(()) => {
            progress.shipping = Some(details);
            progress.state = CheckoutState::ShippingCollected;
            Ok(progress.state)
        }
        Err(errors) => {
            progress.shipping = None;
            progress.fall_back();
            Err(SettlementError::InvalidShipping(errors))
        }
    }
}

/// One settlement attempt, owned by its own task.
struct Attempt {
    user: UserId,
    session: Arc<UserSession>,
    lines: Option<Vec<CartLine>>,
    shipping: ShippingDetails,
    ledger: Arc<dyn BalanceLedger>,
    recorder: Arc<dyn PurchaseRecorder>,
    calculator: TaxCalculator,
    initial_balance: Money,
    rollback_max_elapsed: Duration,
}

impl Attempt {
    async fn run(self) -> Result<Settlement, SettlementError> {
        let _settling = self.session.lock_settlement().await;
        apply_shipping(&self.session, self.shipping.clone()).await?;

        let lines = match self.lines.clone() {
            Some(lines) => lines,
            None => self.session.cart().await.snapshot(),
        };
        if lines.is_empty() {
            return Err(SettlementError::EmptyCart);
        }
        let breakdown = self.calculator.compute(&lines).map_err(|e| {
            error!(user = %self.user, error = %e, "Cart failed pricing preconditions");
            SettlementError::InvalidCart(e)
        })?;

        self.ledger
            .open_account(&self.user, self.initial_balance)
            .await
            .map_err(SettlementError::Ledger)?;

        let balance = match self.ledger.debit(&self.user, breakdown.total).await {
            Ok(balance) => balance,
            Err(LedgerError::InsufficientFunds {
                required,
                available,
            }) => {
                info!(
                    user = %self.user,
                    required = %required,
                    available = %available,
                    "Settlement refused: insufficient funds"
                );
                return Err(SettlementError::InsufficientFunds {
                    required,
                    available,
                });
            }
            Err(e) => return Err(SettlementError::Ledger(e)),
        };
        self.session.set_state(CheckoutState::Debited).await;

        let draft = PurchaseDraft::new(
            self.user.clone(),
            lines,
            breakdown,
            self.shipping.clone(),
        );

        match self.recorder.create(&draft).await {
            Ok(purchase_id) => {
                self.session.cart().await.remove_settled(&draft.lines);
                self.session.set_state(CheckoutState::Persisted).await;
                info!(
                    user = %self.user,
                    purchase_id = %purchase_id,
                    total = %breakdown.total,
                    balance = %balance,
                    "Settlement persisted"
                );
                Ok(Settlement {
                    purchase_id,
                    breakdown,
                    balance,
                })
            }
            Err(err) => {
                warn!(
                    user = %self.user,
                    total = %breakdown.total,
                    error = %err,
                    "Recording purchase failed, reversing debit"
                );
                let rolled_back = self.rollback(breakdown.total).await;
                self.session.progress().await.fall_back();
                Err(SettlementError::Persistence {
                    message: err.to_string(),
                    rolled_back,
                })
            }
        }
    }

    /// Credit back `amount`, retrying transient storage errors.
    async fn rollback(&self, amount: Money) -> bool {
        let backoff = ExponentialBackoff {
            initial_interval: Duration::from_millis(50),
            max_elapsed_time: Some(self.rollback_max_elapsed),
            ..Default::default()
        };

        let result = retry(backoff, || async {
            self.ledger
                .credit(&self.user, amount)
                .await
                .map_err(|e| match e {
                    LedgerError::Storage(_) => backoff::Error::transient(e),
                    other => backoff::Error::permanent(other),
                })
        })
        .await;

        match result {
            Ok(balance) => {
                info!(user = %self.user, amount = %amount, balance = %balance, "Debit reversed");
                true
            }
            Err(e) => {
                error!(
                    user = %self.user,
                    amount = %amount,
                    error = %e,
                    "Compensating credit failed; balance needs manual reconciliation"
                );
                false
            }
        }
    }
}
