// SPDX-FileCopyrightText: 2026 Pricewatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue task representation and per-task retry metadata.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use pricewatch_core::{AccountId, ItemId, normalize_price};

/// One unit of queued work: track `item` at `price`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub item: ItemId,
    pub price: String,
}

impl Task {
    /// Build a task from raw user input, normalizing both fields.
    pub fn new(item_raw: &str, price_raw: &str) -> Self {
        Self {
            item: ItemId::new(item_raw),
            price: normalize_price(price_raw),
        }
    }

    /// Parse one `item,price` queue-file or bulk-import line.
    ///
    /// The split is on the first comma only, so a raw price like `10,00`
    /// survives as the price field and is normalized afterwards. Returns
    /// `None` for lines without a comma or with an empty field.
    pub fn parse_line(line: &str) -> Option<Self> {
        let (item_raw, price_raw) = line.split_once(',')?;
        let item_raw = item_raw.trim();
        let price_raw = price_raw.trim();
        if item_raw.is_empty() || price_raw.is_empty() {
            return None;
        }
        Some(Self::new(item_raw, price_raw))
    }

    /// Render the task as a queue-file line.
    pub fn render_line(&self) -> String {
        format!("{},{}", self.item, self.price)
    }

    /// The metadata key for this task.
    pub fn key(&self) -> TaskKey {
        TaskKey {
            item: self.item.clone(),
            price: self.price.clone(),
        }
    }
}

/// Value-typed composite key for per-task metadata.
///
/// Two enqueues of the same `(item, price)` pair share one metadata entry;
/// the same item at a different price is a distinct logical task.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskKey {
    pub item: ItemId,
    pub price: String,
}

/// Ephemeral retry metadata for one logical task.
///
/// Discarded on terminal success or permanent discard; never persisted, so
/// a restart resets attempt counting for still-pending tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskMeta {
    /// Number of dequeues of this task, including the current one.
    pub attempts: u32,
    /// Accounts already selected for this task.
    pub tried_accounts: HashSet<AccountId>,
    /// Accounts that reported remote capacity exhaustion for this task.
    pub accounts_with_limit: HashSet<AccountId>,
    pub last_attempt: Option<DateTime<Utc>>,
}
