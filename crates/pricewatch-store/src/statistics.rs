// SPDX-FileCopyrightText: 2026 Pricewatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Aggregated store counters for the status surface.

use chrono::{DateTime, Utc};
use pricewatch_core::AccountId;

/// Counters for a single account's tracked items.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountStatistics {
    pub account: AccountId,
    /// Number of items currently tracked on this account.
    pub tracked: usize,
    /// Most recent `last_updated` among this account's items.
    pub last_updated: Option<DateTime<Utc>>,
}

/// Store-wide counters across all configured accounts.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StoreStatistics {
    /// Total tracked items across all accounts.
    pub total: usize,
    /// Per-account breakdown, in configured account order.
    pub accounts: Vec<AccountStatistics>,
}

impl StoreStatistics {
    /// Most recent update across all accounts, if any item exists.
    pub fn most_recent(&self) -> Option<DateTime<Utc>> {
        self.accounts.iter().filter_map(|a| a.last_updated).max()
    }
}
