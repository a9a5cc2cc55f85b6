// SPDX-FileCopyrightText: 2026 Pricewatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock tracking mutator with scripted outcomes.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use pricewatch_core::{
    AutomationHandle, ItemId, MutationOutcome, PricewatchError, TrackingMutator, TrackingOp,
};

/// One call recorded by [`MockMutator`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedMutation {
    pub op: TrackingOp,
    pub handle_id: String,
    pub item: ItemId,
    /// Price for create-or-update; empty for delete.
    pub price: String,
}

/// A mock mutator that pops scripted outcomes FIFO and records every call.
///
/// When the script is empty every mutation succeeds without a title. An
/// `Err` entry in the script exercises the caller-side folding of raised
/// errors into `UNKNOWN` failures.
pub struct MockMutator {
    outcomes: Mutex<VecDeque<Result<MutationOutcome, PricewatchError>>>,
    calls: Mutex<Vec<RecordedMutation>>,
}

impl MockMutator {
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Script the next mutation's outcome.
    pub async fn push_outcome(&self, outcome: MutationOutcome) {
        self.outcomes.lock().await.push_back(Ok(outcome));
    }

    /// Script the next mutation to raise an error.
    pub async fn push_error(&self, message: impl Into<String>) {
        self.outcomes
            .lock()
            .await
            .push_back(Err(PricewatchError::Internal(message.into())));
    }

    /// Every call made so far, in order.
    pub async fn calls(&self) -> Vec<RecordedMutation> {
        self.calls.lock().await.clone()
    }

    async fn next_outcome(&self) -> Result<MutationOutcome, PricewatchError> {
        self.outcomes
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(MutationOutcome::ok(None)))
    }
}

impl Default for MockMutator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TrackingMutator for MockMutator {
    async fn create_or_update(
        &self,
        handle: &dyn AutomationHandle,
        item: &ItemId,
        price: &str,
    ) -> Result<MutationOutcome, PricewatchError> {
        self.calls.lock().await.push(RecordedMutation {
            op: TrackingOp::CreateOrUpdate,
            handle_id: handle.id().to_string(),
            item: item.clone(),
            price: price.to_string(),
        });
        self.next_outcome().await
    }

    async fn delete(
        &self,
        handle: &dyn AutomationHandle,
        item: &ItemId,
    ) -> Result<MutationOutcome, PricewatchError> {
        self.calls.lock().await.push(RecordedMutation {
            op: TrackingOp::Delete,
            handle_id: handle.id().to_string(),
            item: item.clone(),
            price: String::new(),
        });
        self.next_outcome().await
    }
}
