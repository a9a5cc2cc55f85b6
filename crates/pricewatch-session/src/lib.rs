// SPDX-FileCopyrightText: 2026 Pricewatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Browser session lifecycle management.
//!
//! [`SessionManager`] keeps at most one live authenticated automation
//! session per account, reusing sessions across requests within the idle
//! window and recreating them after expiry. A periodic sweep closes sessions
//! that have gone idle so browser instances do not accumulate.

pub mod manager;
pub mod session;

pub use manager::SessionManager;
pub use session::BrowserSession;
