// SPDX-FileCopyrightText: 2026 Pricewatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits at the automation seams.
//!
//! The session manager and task queue are written against these traits;
//! concrete automation backends (a real browser driver, or the binary's
//! dry-run simulation) plug in behind them.

pub mod automation;
pub mod mutator;

pub use automation::{AutomationDriver, AutomationHandle, LoginAdapter};
pub use mutator::TrackingMutator;
