// SPDX-FileCopyrightText: 2026 Pricewatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock automation collaborators for deterministic testing.
//!
//! Provides scripted implementations of the automation driver, login, and
//! mutator traits so session-manager and queue tests run fast and without a
//! browser. Scripted results are popped FIFO; when a script runs dry, each
//! mock falls back to a benign success default.

pub mod mock_driver;
pub mod mock_mutator;

pub use mock_driver::{MockDriver, MockHandle, MockLogin};
pub use mock_mutator::{MockMutator, RecordedMutation};
