// SPDX-FileCopyrightText: 2026 Pricewatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-account tracked-item persistence.
//!
//! Each account owns one JSON document on disk mapping item ids to their
//! tracked price and last-update timestamp. [`TrackingStore`] front-loads an
//! in-memory cache and writes the full document back on every mutation, so
//! the on-disk state always reflects the last completed operation.

pub mod statistics;
pub mod store;

pub use statistics::{AccountStatistics, StoreStatistics};
pub use store::TrackingStore;
