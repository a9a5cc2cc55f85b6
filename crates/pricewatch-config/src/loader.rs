// SPDX-FileCopyrightText: 2026 Pricewatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./pricewatch.toml` > `~/.config/pricewatch/pricewatch.toml`
//! > `/etc/pricewatch/pricewatch.toml` with environment variable overrides
//! via the `PRICEWATCH_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::PricewatchConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/pricewatch/pricewatch.toml` (system-wide)
/// 3. `~/.config/pricewatch/pricewatch.toml` (user XDG config)
/// 4. `./pricewatch.toml` (local directory)
/// 5. `PRICEWATCH_*` environment variables
pub fn load_config() -> Result<PricewatchConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PricewatchConfig::default()))
        .merge(Toml::file("/etc/pricewatch/pricewatch.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("pricewatch/pricewatch.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("pricewatch.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<PricewatchConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PricewatchConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PricewatchConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PricewatchConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `PRICEWATCH_TRACKING_DEFAULT_ACCOUNT`
/// must map to `tracking.default_account`, not `tracking.default.account`.
/// Account credentials are file-only; there is no env mapping for the
/// `[accounts.*]` sections.
fn env_provider() -> Env {
    Env::prefixed("PRICEWATCH_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("tracking_", "tracking.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("queue_", "queue.", 1)
            .replacen("session_", "session.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_yields_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.agent.name, "pricewatch");
        assert_eq!(config.queue.max_attempts, 5);
    }

    #[test]
    fn toml_string_overrides_defaults() {
        let config = load_config_from_str(
            r#"
[agent]
log_level = "debug"

[session]
idle_expiry_secs = 120
"#,
        )
        .unwrap();
        assert_eq!(config.agent.log_level, "debug");
        assert_eq!(config.session.idle_expiry_secs, 120);
        // Untouched sections keep defaults.
        assert_eq!(config.session.sweep_interval_secs, 900);
    }

    #[test]
    fn unknown_key_is_an_error() {
        let result = load_config_from_str(
            r#"
[agent]
naem = "typo"
"#,
        );
        assert!(result.is_err());
    }
}
