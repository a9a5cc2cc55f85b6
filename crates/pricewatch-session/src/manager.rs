// SPDX-FileCopyrightText: 2026 Pricewatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The session manager: per-account session reuse, creation, and expiry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use pricewatch_core::{Account, AccountId, AutomationDriver, AutomationHandle, LoginAdapter};
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::session::BrowserSession;

/// Owns every live browser session, at most one per account.
///
/// Session closing always removes the manager's map entry before releasing
/// the handle, so no caller can re-acquire a session that is mid-close.
/// A failed creation or login yields no session and no state; the next
/// `get_session` call starts fresh, with no backoff at this layer.
pub struct SessionManager {
    driver: Arc<dyn AutomationDriver>,
    login: Arc<dyn LoginAdapter>,
    idle_expiry: Duration,
    sessions: Mutex<HashMap<AccountId, Arc<BrowserSession>>>,
}

impl SessionManager {
    pub fn new(
        driver: Arc<dyn AutomationDriver>,
        login: Arc<dyn LoginAdapter>,
        idle_expiry: Duration,
    ) -> Self {
        Self {
            driver,
            login,
            idle_expiry,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Get a live authenticated session for the account, creating one if
    /// none exists or the existing one has idle-expired.
    ///
    /// Returns `None` when the browser cannot be started or the login is
    /// rejected; the failed handle is released before returning. May suspend
    /// for the duration of browser startup and login; callers wanting
    /// bounded latency wrap this in their own timeout.
    pub async fn get_session(&self, account: &Account) -> Option<Arc<BrowserSession>> {
        let expired = {
            let mut sessions = self.sessions.lock().await;
            match sessions.get(&account.id) {
                Some(existing) if existing.idle_for() < self.idle_expiry => {
                    existing.touch();
                    debug!(account = %account.id, handle = existing.handle().id(),
                        "reusing session");
                    return Some(existing.clone());
                }
                Some(_) => sessions.remove(&account.id),
                None => None,
            }
        };

        if let Some(expired) = expired {
            info!(account = %account.id, "session idle-expired, recreating");
            if let Err(error) = expired.close().await {
                warn!(account = %account.id, %error, "failed to close expired session");
            }
        }

        self.create_session(account).await
    }

    async fn create_session(&self, account: &Account) -> Option<Arc<BrowserSession>> {
        let handle = match self.driver.create_handle(&account.id).await {
            Ok(handle) => handle,
            Err(error) => {
                warn!(account = %account.id, %error, "failed to start automation handle");
                return None;
            }
        };

        match self.login.authenticate(handle.as_ref(), account).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(account = %account.id, "login rejected");
                release_handle(&account.id, handle.as_ref()).await;
                return None;
            }
            Err(error) => {
                warn!(account = %account.id, %error, "login failed");
                release_handle(&account.id, handle.as_ref()).await;
                return None;
            }
        }

        let session = Arc::new(BrowserSession::new(account.id.clone(), handle));

        let mut sessions = self.sessions.lock().await;
        if let Some(existing) = sessions.get(&account.id) {
            // A concurrent caller created a session while we were logging in;
            // keep theirs and release ours.
            existing.touch();
            let winner = existing.clone();
            drop(sessions);
            if let Err(error) = session.close().await {
                warn!(account = %account.id, %error, "failed to close duplicate session");
            }
            return Some(winner);
        }
        sessions.insert(account.id.clone(), session.clone());
        info!(account = %account.id, handle = session.handle().id(), "session created");
        Some(session)
    }

    /// Close the account's session if one exists. Returns whether one did.
    pub async fn close_session(&self, account: &AccountId) -> bool {
        let removed = self.sessions.lock().await.remove(account);
        match removed {
            Some(session) => {
                if let Err(error) = session.close().await {
                    warn!(account = %account, %error, "failed to close session");
                }
                info!(account = %account, "session closed");
                true
            }
            None => false,
        }
    }

    /// Close every live session. Returns the number closed.
    pub async fn close_all(&self) -> usize {
        let drained: Vec<(AccountId, Arc<BrowserSession>)> =
            self.sessions.lock().await.drain().collect();
        let count = drained.len();
        for (account, session) in drained {
            if let Err(error) = session.close().await {
                warn!(account = %account, %error, "failed to close session");
            }
        }
        if count > 0 {
            info!(count, "closed all sessions");
        }
        count
    }

    /// Close every session idle beyond the expiry threshold. Returns the
    /// number closed.
    pub async fn sweep_expired(&self) -> usize {
        let expired: Vec<(AccountId, Arc<BrowserSession>)> = {
            let mut sessions = self.sessions.lock().await;
            let ids: Vec<AccountId> = sessions
                .iter()
                .filter(|(_, s)| s.idle_for() >= self.idle_expiry)
                .map(|(id, _)| id.clone())
                .collect();
            ids.into_iter()
                .filter_map(|id| sessions.remove(&id).map(|s| (id, s)))
                .collect()
        };
        let count = expired.len();
        for (account, session) in expired {
            debug!(account = %account, "closing idle session");
            if let Err(error) = session.close().await {
                warn!(account = %account, %error, "failed to close idle session");
            }
        }
        count
    }

    /// Number of currently live sessions.
    pub async fn live_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Periodic expiry sweep, intended to be spawned at startup.
    ///
    /// Runs until the cancellation token fires.
    pub async fn run_expiry_sweep(self: Arc<Self>, interval: Duration, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; skip it.
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("expiry sweep stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let closed = self.sweep_expired().await;
                    if closed > 0 {
                        info!(closed, "closed idle sessions");
                    }
                }
            }
        }
    }
}

async fn release_handle(account: &AccountId, handle: &dyn AutomationHandle) {
    if let Err(error) = handle.close().await {
        warn!(account = %account, %error, "failed to release automation handle");
    }
}
