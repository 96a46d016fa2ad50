//! Purchase persistence contract.

use crate::domain::{Purchase, PurchaseDraft, PurchaseId, UserId};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub mod mock;

pub use mock::MockPurchaseRecorder;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("persistence error: {0}")]
pub struct PersistenceError(pub String);

impl From<sqlx::Error> for PersistenceError {
    fn from(err: sqlx::Error) -> Self {
        PersistenceError(err.to_string())
    }
}

/// One page of a user's purchase history, newest first.
///
/// `before` is the id of the last purchase on the previous page; the page
/// holds purchases strictly older than it. An id that is not one of the
/// user's purchases yields an empty page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchasePage {
    pub limit: u32,
    pub before: Option<PurchaseId>,
}

impl PurchasePage {
    pub const DEFAULT_LIMIT: u32 = 20;
    pub const MAX_LIMIT: u32 = 100;

    /// First page of `limit` purchases, clamped to `1..=MAX_LIMIT`.
    pub fn first(limit: u32) -> Self {
        Self {
            limit: limit.clamp(1, Self::MAX_LIMIT),
            before: None,
        }
    }

    pub fn before(mut self, id: PurchaseId) -> Self {
        self.before = Some(id);
        self
    }
}

impl Default for PurchasePage {
    fn default() -> Self {
        Self::first(Self::DEFAULT_LIMIT)
    }
}

/// Durable store for purchases.
///
/// `create` is all-or-nothing: the purchase and every one of its lines are
/// stored together, or nothing is.
#[async_trait]
pub trait PurchaseRecorder: Send + Sync + fmt::Debug {
    async fn create(&self, draft: &PurchaseDraft) -> Result<PurchaseId, PersistenceError>;

    /// One page of `user`'s purchases, newest first.
    async fn list_by_user(
        &self,
        user: &UserId,
        page: PurchasePage,
    ) -> Result<Vec<Purchase>, PersistenceError>;
}
