// SPDX-FileCopyrightText: 2026 Pricewatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable task queue, capacity-aware account selection, and the background
//! worker that drives automated tracking mutations.
//!
//! Tasks are `(item, price)` pairs processed FIFO, with failed tasks
//! re-enqueued at the tail. Per-task retry metadata (attempt count, tried
//! accounts, accounts that reported a remote limit) steers account selection
//! so work converges instead of hammering a saturated account. The queue
//! file is rewritten on every mutation, so pending work survives restarts.

pub mod queue;
pub mod service;
pub mod task;

pub use queue::{BulkImportReport, ProcessOutcome, QueueSettings, QueueStatus, TaskQueue};
pub use service::TrackerService;
pub use task::{Task, TaskKey, TaskMeta};
