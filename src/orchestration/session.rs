//! Per-user session state: cart, checkout progress, settlement lock.

use crate::domain::{Cart, ShippingDetails, UserId};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, OwnedMutexGuard};

/// Where a user's checkout stands.
///
/// `Idle → ShippingCollected → Debited → Persisted`. Failures drop back to
/// `ShippingCollected` when valid shipping is on file, otherwise `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CheckoutState {
    Idle,
    ShippingCollected,
    Debited,
    Persisted,
}

impl CheckoutState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutState::Idle => "idle",
            CheckoutState::ShippingCollected => "shippingCollected",
            CheckoutState::Debited => "debited",
            CheckoutState::Persisted => "persisted",
        }
    }
}

impl std::fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct CheckoutProgress {
    pub state: CheckoutState,
    /// Last validated shipping details.
    pub shipping: Option<ShippingDetails>,
}

impl Default for CheckoutProgress {
    fn default() -> Self {
        Self {
            state: CheckoutState::Idle,
            shipping: None,
        }
    }
}

impl CheckoutProgress {
    /// The resting state after a failed attempt.
    pub fn fall_back(&mut self) {
        self.state = if self.shipping.is_some() {
            CheckoutState::ShippingCollected
        } else {
            CheckoutState::Idle
        };
    }
}

#[derive(Debug, Default)]
pub struct UserSession {
    cart: Mutex<Cart>,
    progress: Mutex<CheckoutProgress>,
    settle_lock: Arc<Mutex<()>>,
}

impl UserSession {
    pub async fn cart(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().await
    }

    pub async fn progress(&self) -> MutexGuard<'_, CheckoutProgress> {
        self.progress.lock().await
    }

    pub async fn set_state(&self, state: CheckoutState) {
        self.progress.lock().await.state = state;
    }

    /// Held for the whole of one settlement attempt.
    pub async fn lock_settlement(&self) -> OwnedMutexGuard<()> {
        self.settle_lock.clone().lock_owned().await
    }
}

/// Sessions keyed by user.
///
/// Only mutations create a session; lookups for unseen users leave the map
/// untouched so read traffic cannot grow it.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<UserId, Arc<UserSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_create(&self, user: &UserId) -> Arc<UserSession> {
        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(user.clone())
            .or_insert_with(|| Arc::new(UserSession::default()))
            .clone()
    }

    pub async fn get(&self, user: &UserId) -> Option<Arc<UserSession>> {
        self.sessions.lock().await.get(user).cloned()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
