// SPDX-FileCopyrightText: 2026 Pricewatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock automation driver and login adapter.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use pricewatch_core::{
    Account, AccountId, AutomationDriver, AutomationHandle, LoginAdapter, PricewatchError,
};

/// A mock browser handle with a stable id and a close flag.
pub struct MockHandle {
    id: String,
    closed: Arc<AtomicBool>,
}

impl MockHandle {
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AutomationHandle for MockHandle {
    fn id(&self) -> &str {
        &self.id
    }

    async fn close(&self) -> Result<(), PricewatchError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// A mock driver that hands out sequentially numbered handles.
///
/// Handle ids are `mock-<account>-<n>` so tests can assert session reuse by
/// comparing handle identity. Every created handle's close flag is retained
/// so tests can verify release on all exit paths.
pub struct MockDriver {
    counter: AtomicU64,
    created: Mutex<Vec<(String, Arc<AtomicBool>)>>,
    fail_creates: Mutex<VecDeque<String>>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
            created: Mutex::new(Vec::new()),
            fail_creates: Mutex::new(VecDeque::new()),
        }
    }

    /// Script the next `create_handle` call to fail with the given message.
    pub async fn fail_next_create(&self, message: impl Into<String>) {
        self.fail_creates.lock().await.push_back(message.into());
    }

    /// Total handles created so far.
    pub fn created_count(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }

    /// Ids of created handles that have been closed.
    pub async fn closed_ids(&self) -> Vec<String> {
        self.created
            .lock()
            .await
            .iter()
            .filter(|(_, closed)| closed.load(Ordering::SeqCst))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Ids of created handles that are still open.
    pub async fn open_ids(&self) -> Vec<String> {
        self.created
            .lock()
            .await
            .iter()
            .filter(|(_, closed)| !closed.load(Ordering::SeqCst))
            .map(|(id, _)| id.clone())
            .collect()
    }
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AutomationDriver for MockDriver {
    async fn create_handle(
        &self,
        account: &AccountId,
    ) -> Result<Box<dyn AutomationHandle>, PricewatchError> {
        if let Some(message) = self.fail_creates.lock().await.pop_front() {
            return Err(PricewatchError::Session {
                message,
                source: None,
            });
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let id = format!("mock-{account}-{n}");
        let closed = Arc::new(AtomicBool::new(false));
        self.created.lock().await.push((id.clone(), closed.clone()));
        Ok(Box::new(MockHandle { id, closed }))
    }
}

/// A mock login adapter with a FIFO script of authentication results.
///
/// When the script is empty every login succeeds.
pub struct MockLogin {
    results: Mutex<VecDeque<Result<bool, PricewatchError>>>,
    attempts: Mutex<Vec<AccountId>>,
}

impl MockLogin {
    pub fn new() -> Self {
        Self {
            results: Mutex::new(VecDeque::new()),
            attempts: Mutex::new(Vec::new()),
        }
    }

    /// Script the next authentication to be rejected (`Ok(false)`).
    pub async fn reject_next(&self) {
        self.results.lock().await.push_back(Ok(false));
    }

    /// Script the next authentication to fail with a plumbing error.
    pub async fn fail_next(&self, message: impl Into<String>) {
        self.results.lock().await.push_back(Err(PricewatchError::Session {
            message: message.into(),
            source: None,
        }));
    }

    /// Accounts for which authentication was attempted, in order.
    pub async fn attempts(&self) -> Vec<AccountId> {
        self.attempts.lock().await.clone()
    }
}

impl Default for MockLogin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LoginAdapter for MockLogin {
    async fn authenticate(
        &self,
        _handle: &dyn AutomationHandle,
        account: &Account,
    ) -> Result<bool, PricewatchError> {
        self.attempts.lock().await.push(account.id.clone());
        self.results.lock().await.pop_front().unwrap_or(Ok(true))
    }
}
