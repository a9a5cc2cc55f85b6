// SPDX-FileCopyrightText: 2026 Pricewatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Pricewatch tracking automation system.
//!
//! This crate provides the foundational trait definitions, error types, and
//! domain types used throughout the Pricewatch workspace. The session
//! manager, task queue, and store are written against the traits defined
//! here; automation backends implement them.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::PricewatchError;
pub use types::{
    Account, AccountId, ItemId, MutationErrorKind, MutationOutcome, TrackedItem, TrackingOp,
    normalize_price,
};

// Re-export the collaborator traits at crate root.
pub use traits::{AutomationDriver, AutomationHandle, LoginAdapter, TrackingMutator};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_has_all_variants() {
        let _config = PricewatchError::Config("test".into());
        let _store = PricewatchError::Store {
            source: Box::new(std::io::Error::other("test")),
        };
        let _session = PricewatchError::Session {
            message: "test".into(),
            source: None,
        };
        let _not_found = PricewatchError::AccountNotFound {
            name: "Premium".into(),
        };
        let _timeout = PricewatchError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _internal = PricewatchError::Internal("test".into());
    }

    #[test]
    fn account_not_found_message_names_account() {
        let err = PricewatchError::AccountNotFound {
            name: "Meraxes".into(),
        };
        assert_eq!(err.to_string(), "account not found: Meraxes");
    }

    #[test]
    fn collaborator_traits_are_object_safe() {
        fn _driver(_: &dyn AutomationDriver) {}
        fn _handle(_: &dyn AutomationHandle) {}
        fn _login(_: &dyn LoginAdapter) {}
        fn _mutator(_: &dyn TrackingMutator) {}
    }
}
