// SPDX-FileCopyrightText: 2026 Pricewatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracking mutator trait: the contract for executing one logical tracking
//! operation through an authenticated session.
//!
//! The DOM mechanics behind these calls are an implementation detail of the
//! automation backend. What the rest of the system depends on is the
//! structured outcome and its error taxonomy: the task queue's retry and
//! account-exclusion policy branches on [`MutationErrorKind`].
//!
//! [`MutationErrorKind`]: crate::types::MutationErrorKind

use async_trait::async_trait;

use crate::error::PricewatchError;
use crate::traits::automation::AutomationHandle;
use crate::types::{ItemId, MutationOutcome};

/// Executes tracking mutations against the remote service.
///
/// Callers treat an `Err` return exactly like
/// `MutationOutcome::failed(MutationErrorKind::Unknown)`.
#[async_trait]
pub trait TrackingMutator: Send + Sync {
    /// Creates a price alert for the item, or updates the existing one.
    ///
    /// `price` is already normalized (`.` separator, two fraction digits).
    async fn create_or_update(
        &self,
        handle: &dyn AutomationHandle,
        item: &ItemId,
        price: &str,
    ) -> Result<MutationOutcome, PricewatchError>;

    /// Deletes the item's price alert.
    async fn delete(
        &self,
        handle: &dyn AutomationHandle,
        item: &ItemId,
    ) -> Result<MutationOutcome, PricewatchError>;
}
