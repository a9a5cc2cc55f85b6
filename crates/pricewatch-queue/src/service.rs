// SPDX-FileCopyrightText: 2026 Pricewatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The tracker service: the contract exposed to the command surface.
//!
//! Thin facade over the queue, store, and session manager so the CLI (or
//! any other front end) talks to one object. Ad-hoc mutations bypass the
//! queue but still go through the session manager, wrapped in a short retry
//! policy because a cold browser start is the most failure-prone moment.

use std::sync::Arc;

use pricewatch_config::AccountRegistry;
use pricewatch_core::{
    Account, AccountId, ItemId, MutationErrorKind, MutationOutcome, PricewatchError, TrackedItem,
    TrackingMutator, TrackingOp, normalize_price,
};
use pricewatch_resilience::{RetryPolicy, retry};
use pricewatch_session::SessionManager;
use pricewatch_store::{StoreStatistics, TrackingStore};
use tracing::{info, warn};

use crate::queue::{BulkImportReport, QueueStatus, TaskQueue};
use crate::task::Task;

/// Long-lived service object constructed once by the composition root.
pub struct TrackerService {
    registry: AccountRegistry,
    store: Arc<TrackingStore>,
    sessions: Arc<SessionManager>,
    mutator: Arc<dyn TrackingMutator>,
    queue: Arc<TaskQueue>,
    manual_retry: RetryPolicy,
}

impl TrackerService {
    pub fn new(
        registry: AccountRegistry,
        store: Arc<TrackingStore>,
        sessions: Arc<SessionManager>,
        mutator: Arc<dyn TrackingMutator>,
        queue: Arc<TaskQueue>,
    ) -> Self {
        Self {
            registry,
            store,
            sessions,
            mutator,
            queue,
            // Two attempts for ad-hoc requests: one browser restart is worth
            // retrying, more just makes the caller wait.
            manual_retry: RetryPolicy::with_max_attempts(2),
        }
    }

    /// Enqueue one item for automated tracking. Returns the queue size.
    pub async fn enqueue_manual(&self, item_raw: &str, price_raw: &str) -> usize {
        self.queue.add(Task::new(item_raw, price_raw)).await
    }

    /// Enqueue `item,price` lines from a bulk source.
    pub async fn enqueue_bulk(&self, raw: &str) -> BulkImportReport {
        self.queue.add_from_bulk_source(raw).await
    }

    pub async fn pause(&self) -> QueueStatus {
        self.queue.pause();
        self.queue.status().await
    }

    pub async fn resume(&self) -> QueueStatus {
        self.queue.resume();
        self.queue.status().await
    }

    pub async fn clear(&self) -> QueueStatus {
        self.queue.clear().await;
        self.queue.status().await
    }

    pub async fn status(&self) -> QueueStatus {
        self.queue.status().await
    }

    pub async fn store_statistics(&self) -> Result<StoreStatistics, PricewatchError> {
        self.store.statistics().await
    }

    /// Execute one tracking mutation immediately, bypassing the queue.
    ///
    /// Session acquisition failures and raised mutator errors are retried
    /// per the manual retry policy and, once exhausted, folded into an
    /// unsuccessful [`MutationOutcome`]. An unknown account is the one
    /// error that propagates: it is a configuration mistake, not a
    /// retryable condition.
    pub async fn mutate_now(
        &self,
        account: Option<&AccountId>,
        item_raw: &str,
        price_raw: &str,
        op: TrackingOp,
    ) -> Result<MutationOutcome, PricewatchError> {
        let account = match account {
            Some(id) => self.registry.get(id)?.clone(),
            None => self.registry.get_default().clone(),
        };
        let item = ItemId::new(item_raw);
        let price = normalize_price(price_raw);

        let attempt = || self.mutate_once(&account, &item, &price, op);
        let outcome = match retry(&self.manual_retry, "manual mutation", attempt).await {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(account = %account.id, item = %item, %error,
                    "manual mutation failed after retries");
                return Ok(MutationOutcome::failed(MutationErrorKind::Unknown));
            }
        };

        if outcome.success {
            match op {
                TrackingOp::CreateOrUpdate => {
                    if let Err(error) = self
                        .store
                        .put(&account.id, &item, &price, outcome.title.clone())
                        .await
                    {
                        warn!(account = %account.id, item = %item, %error,
                            "store write failed after manual mutation");
                    }
                }
                TrackingOp::Delete => {
                    if let Err(error) = self.store.delete(&account.id, &item).await {
                        warn!(account = %account.id, item = %item, %error,
                            "store delete failed after manual mutation");
                    }
                }
            }
            info!(account = %account.id, item = %item, %op, "manual mutation succeeded");
        }
        Ok(outcome)
    }

    /// One attempt of an ad-hoc mutation: acquire a session, mutate.
    ///
    /// Errors here feed the retry policy; an unsuccessful outcome is a
    /// definitive answer from the service and is not retried.
    async fn mutate_once(
        &self,
        account: &Account,
        item: &ItemId,
        price: &str,
        op: TrackingOp,
    ) -> Result<MutationOutcome, PricewatchError> {
        let session =
            self.sessions
                .get_session(account)
                .await
                .ok_or_else(|| PricewatchError::Session {
                    message: format!("no session for account {}", account.id),
                    source: None,
                })?;
        match op {
            TrackingOp::CreateOrUpdate => {
                self.mutator
                    .create_or_update(session.handle(), item, price)
                    .await
            }
            TrackingOp::Delete => self.mutator.delete(session.handle(), item).await,
        }
    }

    /// Tracked items for one account, or across all accounts.
    pub async fn list_tracked(
        &self,
        account: Option<&AccountId>,
    ) -> Result<Vec<(AccountId, ItemId, TrackedItem)>, PricewatchError> {
        if let Some(id) = account {
            // Validate before hitting the store so a typo'd account name
            // surfaces as a configuration error, not an empty listing.
            self.registry.get(id)?;
        }
        self.store.list(account).await
    }

    /// One tracked item, if present.
    pub async fn get_tracked(
        &self,
        account: &AccountId,
        item_raw: &str,
    ) -> Result<Option<TrackedItem>, PricewatchError> {
        self.registry.get(account)?;
        self.store.get(account, &ItemId::new(item_raw)).await
    }
}
