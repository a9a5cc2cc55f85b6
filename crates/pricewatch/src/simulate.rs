// SPDX-FileCopyrightText: 2026 Pricewatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Simulated automation backend for dry runs.
//!
//! Implements the driver, login, and mutator traits by logging the intended
//! action and succeeding, so the full pipeline (queue, selection, sessions,
//! store write-through) can run end-to-end without a browser. A real DOM
//! automation backend plugs in behind the same traits.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use pricewatch_core::{
    Account, AccountId, AutomationDriver, AutomationHandle, ItemId, LoginAdapter, MutationOutcome,
    PricewatchError, TrackingMutator,
};
use tracing::{debug, info};

pub struct SimulatedHandle {
    id: String,
}

#[async_trait]
impl AutomationHandle for SimulatedHandle {
    fn id(&self) -> &str {
        &self.id
    }

    async fn close(&self) -> Result<(), PricewatchError> {
        debug!(handle = %self.id, "simulated browser closed");
        Ok(())
    }
}

/// Hands out sequentially numbered simulated browser handles.
pub struct SimulatedDriver {
    counter: AtomicU64,
}

impl SimulatedDriver {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
        }
    }
}

impl Default for SimulatedDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AutomationDriver for SimulatedDriver {
    async fn create_handle(
        &self,
        account: &AccountId,
    ) -> Result<Box<dyn AutomationHandle>, PricewatchError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let id = format!("sim-{account}-{n}");
        info!(account = %account, handle = %id, "simulated browser started");
        Ok(Box::new(SimulatedHandle { id }))
    }
}

/// Accepts every login.
pub struct SimulatedLogin;

#[async_trait]
impl LoginAdapter for SimulatedLogin {
    async fn authenticate(
        &self,
        handle: &dyn AutomationHandle,
        account: &Account,
    ) -> Result<bool, PricewatchError> {
        info!(account = %account.id, handle = handle.id(), username = %account.username,
            "simulated login");
        Ok(true)
    }
}

/// Reports every mutation as successful.
pub struct SimulatedMutator;

#[async_trait]
impl TrackingMutator for SimulatedMutator {
    async fn create_or_update(
        &self,
        handle: &dyn AutomationHandle,
        item: &ItemId,
        price: &str,
    ) -> Result<MutationOutcome, PricewatchError> {
        info!(handle = handle.id(), item = %item, price, "simulated create_or_update");
        Ok(MutationOutcome::ok(Some(format!("Simulated product {item}"))))
    }

    async fn delete(
        &self,
        handle: &dyn AutomationHandle,
        item: &ItemId,
    ) -> Result<MutationOutcome, PricewatchError> {
        info!(handle = handle.id(), item = %item, "simulated delete");
        Ok(MutationOutcome::ok(None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn driver_numbers_handles_per_creation() {
        let driver = SimulatedDriver::new();
        let a = driver
            .create_handle(&AccountId::from("Premium"))
            .await
            .unwrap();
        let b = driver
            .create_handle(&AccountId::from("Premium"))
            .await
            .unwrap();
        assert_eq!(a.id(), "sim-Premium-1");
        assert_eq!(b.id(), "sim-Premium-2");
    }

    #[tokio::test]
    async fn login_always_succeeds() {
        let driver = SimulatedDriver::new();
        let handle = driver
            .create_handle(&AccountId::from("Premium"))
            .await
            .unwrap();
        let account = Account {
            id: AccountId::from("Premium"),
            username: "premium@example.com".to_string(),
            password: "pw".to_string(),
            capacity_ceiling: 4999,
        };
        assert!(
            SimulatedLogin
                .authenticate(handle.as_ref(), &account)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn mutator_reports_success_with_title() {
        let driver = SimulatedDriver::new();
        let handle = driver
            .create_handle(&AccountId::from("Premium"))
            .await
            .unwrap();
        let outcome = SimulatedMutator
            .create_or_update(handle.as_ref(), &ItemId::new("B000AAAAAA"), "10.00")
            .await
            .unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.title.as_deref(), Some("Simulated product B000AAAAAA"));
    }
}
