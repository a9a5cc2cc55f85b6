// SPDX-FileCopyrightText: 2026 Pricewatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Browser automation driver and login traits.
//!
//! A driver produces opaque handles (one per browser instance); the session
//! manager owns each handle for its lifetime and is the only component that
//! closes it. Login is a separate collaborator so the manager can release a
//! handle whose authentication failed without caring why.

use async_trait::async_trait;

use crate::error::PricewatchError;
use crate::types::{Account, AccountId};

/// An owned, opaque handle to one live browser automation instance.
///
/// Handles are created by an [`AutomationDriver`] and released exactly once
/// via [`close`](AutomationHandle::close). Closing is idempotent at the
/// driver's discretion; callers must not use a handle after closing it.
#[async_trait]
pub trait AutomationHandle: Send + Sync {
    /// Stable identity of the underlying browser instance, used to verify
    /// session reuse in tests and to correlate log lines.
    fn id(&self) -> &str;

    /// Releases the underlying automation resource.
    async fn close(&self) -> Result<(), PricewatchError>;
}

/// Creates browser automation handles for accounts.
#[async_trait]
pub trait AutomationDriver: Send + Sync {
    /// Starts a new browser instance for the given account.
    ///
    /// May suspend for the duration of browser startup (seconds). Callers
    /// wanting bounded latency wrap this in their own timeout.
    async fn create_handle(
        &self,
        account: &AccountId,
    ) -> Result<Box<dyn AutomationHandle>, PricewatchError>;
}

/// Authenticates a browser handle against the tracking service.
#[async_trait]
pub trait LoginAdapter: Send + Sync {
    /// Attempts to log the handle's browser into the tracking service with
    /// the account's credentials.
    ///
    /// Returns `Ok(false)` for a rejected login (bad credentials, CAPTCHA,
    /// OTP challenge); `Err` only for plumbing failures. Both lead the
    /// session manager to release the handle and report no session.
    async fn authenticate(
        &self,
        handle: &dyn AutomationHandle,
        account: &Account,
    ) -> Result<bool, PricewatchError>;
}
