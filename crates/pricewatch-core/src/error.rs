// SPDX-FileCopyrightText: 2026 Pricewatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Pricewatch tracking automation system.

use thiserror::Error;

/// The primary error type used across all Pricewatch crates.
#[derive(Debug, Error)]
pub enum PricewatchError {
    /// Configuration errors (invalid TOML, missing accounts, bad defaults).
    #[error("configuration error: {0}")]
    Config(String),

    /// Store persistence errors (file read/write, JSON serialization).
    #[error("store error: {source}")]
    Store {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Browser session errors (driver startup, authentication plumbing).
    #[error("session error: {message}")]
    Session {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Requested account is not in the configured registry.
    ///
    /// This is a configuration error: callers must surface it immediately
    /// and never retry it.
    #[error("account not found: {name}")]
    AccountNotFound { name: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
