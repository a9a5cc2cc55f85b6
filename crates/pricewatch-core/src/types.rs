// SPDX-FileCopyrightText: 2026 Pricewatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Pricewatch workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identifier of a tracking-service account, fixed at configuration time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        AccountId(s.to_string())
    }
}

/// Identifier of a tracked product.
///
/// Item ids are normalized to uppercase on construction; the tracking
/// service treats them case-insensitively and the stores key on the
/// normalized form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(raw: &str) -> Self {
        ItemId(raw.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize a user-supplied price string.
///
/// Accepts `,` or `.` as the decimal separator and renders the value with a
/// `.` separator and exactly two fraction digits (`"10,5"` -> `"10.50"`).
/// Strings that do not parse as a number are returned with only the
/// separator replaced, leaving rejection to the tracking service.
pub fn normalize_price(raw: &str) -> String {
    let replaced = raw.trim().replace(',', ".");
    match replaced.parse::<f64>() {
        Ok(value) => format!("{value:.2}"),
        Err(_) => replaced,
    }
}

/// One configured tracking-service account with its credentials.
///
/// Accounts are immutable for the process lifetime; the set is fixed when
/// configuration is loaded.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    pub password: String,
    /// Maximum number of items this account may track.
    pub capacity_ceiling: u32,
}

/// One tracked item as persisted in an account's store document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedItem {
    /// Normalized price string (`.` separator, two fraction digits).
    pub price: String,
    /// Timestamp of the last successful mutation, RFC 3339 with timezone.
    pub last_updated: DateTime<Utc>,
    /// Product title discovered during the mutation, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_title: Option<String>,
}

/// Classification of a failed tracking-service mutation.
///
/// The task queue's retry and account-exclusion logic branches on these:
/// `LimitReached` steers account selection while the transient kinds drive
/// plain re-enqueue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum MutationErrorKind {
    /// The remote service reported the account's tracking limit is exhausted.
    LimitReached,
    /// Transient navigation or render failure.
    PageError,
    /// Input submission failure.
    FormError,
    /// Anything else, including raised errors from the automation layer.
    Unknown,
}

/// Structured outcome of a tracking mutation.
///
/// Mutations never surface as bare errors to the queue or the command
/// surface; a raised error from the automation layer is folded into
/// `(success: false, error: Unknown)`.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome {
    pub success: bool,
    pub title: Option<String>,
    pub error: Option<MutationErrorKind>,
}

impl MutationOutcome {
    pub fn ok(title: Option<String>) -> Self {
        Self {
            success: true,
            title,
            error: None,
        }
    }

    pub fn failed(kind: MutationErrorKind) -> Self {
        Self {
            success: false,
            title: None,
            error: Some(kind),
        }
    }
}

/// The logical operation a mutation request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum TrackingOp {
    CreateOrUpdate,
    Delete,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn item_id_uppercases_and_trims() {
        let id = ItemId::new("  b000aaaaaa ");
        assert_eq!(id.as_str(), "B000AAAAAA");
    }

    #[test]
    fn normalize_price_comma_separator() {
        assert_eq!(normalize_price("10,00"), "10.00");
        assert_eq!(normalize_price("129,9"), "129.90");
    }

    #[test]
    fn normalize_price_already_normalized() {
        assert_eq!(normalize_price("20.50"), "20.50");
    }

    #[test]
    fn normalize_price_pads_fraction_digits() {
        assert_eq!(normalize_price("7"), "7.00");
        assert_eq!(normalize_price(" 19.9 "), "19.90");
    }

    #[test]
    fn normalize_price_keeps_unparseable_input() {
        assert_eq!(normalize_price("n/a"), "n/a");
    }

    #[test]
    fn mutation_error_kind_round_trips() {
        for kind in [
            MutationErrorKind::LimitReached,
            MutationErrorKind::PageError,
            MutationErrorKind::FormError,
            MutationErrorKind::Unknown,
        ] {
            let s = kind.to_string();
            assert_eq!(MutationErrorKind::from_str(&s).unwrap(), kind);
        }
        assert_eq!(MutationErrorKind::LimitReached.to_string(), "LIMIT_REACHED");
    }

    #[test]
    fn mutation_outcome_constructors() {
        let ok = MutationOutcome::ok(Some("Widget".to_string()));
        assert!(ok.success);
        assert_eq!(ok.title.as_deref(), Some("Widget"));
        assert!(ok.error.is_none());

        let failed = MutationOutcome::failed(MutationErrorKind::PageError);
        assert!(!failed.success);
        assert_eq!(failed.error, Some(MutationErrorKind::PageError));
    }

    #[test]
    fn tracked_item_json_layout() {
        let item = TrackedItem {
            price: "129.90".to_string(),
            last_updated: "2026-04-06T12:34:56Z".parse().unwrap(),
            product_title: Some("Example Product".to_string()),
        };
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"price\":\"129.90\""));
        assert!(json.contains("\"product_title\":\"Example Product\""));

        // Title is omitted entirely when absent.
        let bare = TrackedItem {
            product_title: None,
            ..item
        };
        let json = serde_json::to_string(&bare).unwrap();
        assert!(!json.contains("product_title"));
    }
}
