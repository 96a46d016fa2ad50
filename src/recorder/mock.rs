//! In-memory recorder with switchable failure, for tests and demos.

use super::{PersistenceError, PurchasePage, PurchaseRecorder};
use crate::domain::{Purchase, PurchaseDraft, PurchaseId, UserId};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
pub struct MockPurchaseRecorder {
    purchases: Mutex<Vec<Purchase>>,
    failing: AtomicBool,
    create_calls: AtomicUsize,
}

impl MockPurchaseRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A recorder whose `create` always fails.
    pub fn failing() -> Self {
        let recorder = Self::default();
        recorder.set_failing(true);
        recorder
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `create` calls, successful or not.
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.purchases.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl PurchaseRecorder for MockPurchaseRecorder {
    async fn create(&self, draft: &PurchaseDraft) -> Result<PurchaseId, PersistenceError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(PersistenceError("mock recorder forced failure".to_string()));
        }

        let id = PurchaseId::new_v4();
        self.purchases
            .lock()
            .await
            .push(draft.clone().into_purchase(id));
        Ok(id)
    }

    async fn list_by_user(
        &self,
        user: &UserId,
        page: PurchasePage,
    ) -> Result<Vec<Purchase>, PersistenceError> {
        let purchases = self.purchases.lock().await;
        // Stored oldest first; reversing before the stable sort breaks
        // timestamp ties newest first.
        let mut mine: Vec<&Purchase> = purchases
            .iter()
            .rev()
            .filter(|p| &p.user_id == user)
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let start = match page.before {
            Some(id) => match mine.iter().position(|p| p.id == id) {
                Some(idx) => idx + 1,
                None => return Ok(Vec::new()),
            },
            None => 0,
        };
        Ok(mine
            .into_iter()
            .skip(start)
            .take(page.limit as usize)
            .cloned()
            .collect())
    }
}
