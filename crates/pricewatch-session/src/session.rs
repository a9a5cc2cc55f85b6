// SPDX-FileCopyrightText: 2026 Pricewatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One live authenticated browser session.

use std::sync::Mutex;
use std::time::Duration;

use pricewatch_core::{AccountId, AutomationHandle, PricewatchError};
use tokio::time::Instant;

/// An authenticated automation session bound to one account.
///
/// Owned by the [`SessionManager`](crate::SessionManager) and shared with
/// callers behind an `Arc`. Only the manager closes the underlying handle;
/// callers borrow it for the duration of a mutation.
pub struct BrowserSession {
    account: AccountId,
    handle: Box<dyn AutomationHandle>,
    last_used: Mutex<Instant>,
}

impl BrowserSession {
    pub(crate) fn new(account: AccountId, handle: Box<dyn AutomationHandle>) -> Self {
        Self {
            account,
            handle,
            last_used: Mutex::new(Instant::now()),
        }
    }

    /// The account this session is authenticated for.
    pub fn account(&self) -> &AccountId {
        &self.account
    }

    /// The automation handle, for passing to a mutator.
    pub fn handle(&self) -> &dyn AutomationHandle {
        self.handle.as_ref()
    }

    /// Mark the session as used now, restarting its idle window.
    pub(crate) fn touch(&self) {
        let mut last_used = match self.last_used.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *last_used = Instant::now();
    }

    /// Time since the last use.
    pub fn idle_for(&self) -> Duration {
        let last_used = match self.last_used.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        last_used.elapsed()
    }

    pub(crate) async fn close(&self) -> Result<(), PricewatchError> {
        self.handle.close().await
    }
}
