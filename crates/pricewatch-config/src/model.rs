// SPDX-FileCopyrightText: 2026 Pricewatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Pricewatch.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Top-level Pricewatch configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections except `[accounts.*]` default to sensible values;
/// the account set is fixed at load time and never changes afterwards.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PricewatchConfig {
    /// Process identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Tracking-service accounts keyed by identifier, e.g. `[accounts.Premium]`.
    ///
    /// A `BTreeMap` so the account ordering is stable across runs.
    #[serde(default)]
    pub accounts: BTreeMap<String, AccountConfig>,

    /// Tracking behavior: default account, per-account capacity ceiling.
    #[serde(default)]
    pub tracking: TrackingConfig,

    /// On-disk layout for the store documents and the queue file.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Task queue retry and pacing settings.
    #[serde(default)]
    pub queue: QueueConfig,

    /// Browser session expiry settings.
    #[serde(default)]
    pub session: SessionConfig,
}

/// Process identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the process.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "pricewatch".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Credentials for one tracking-service account.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AccountConfig {
    pub username: String,
    pub password: String,
}

/// Tracking behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TrackingConfig {
    /// Account used when a request names none.
    #[serde(default = "default_account")]
    pub default_account: String,

    /// Maximum number of items any one account may track.
    ///
    /// Enforced locally by the task queue's account selection; the remote
    /// service enforces its own limit and reports `LIMIT_REACHED` past it.
    #[serde(default = "default_capacity_ceiling")]
    pub capacity_ceiling: u32,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            default_account: default_account(),
            capacity_ceiling: default_capacity_ceiling(),
        }
    }
}

fn default_account() -> String {
    "Premium".to_string()
}

fn default_capacity_ceiling() -> u32 {
    4999
}

/// On-disk layout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory holding the per-account store documents.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Path of the durable task queue file.
    #[serde(default = "default_queue_file")]
    pub queue_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            queue_file: default_queue_file(),
        }
    }
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_queue_file() -> String {
    "data/task_queue.txt".to_string()
}

/// Task queue retry and pacing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QueueConfig {
    /// Attempts after which a task is permanently discarded.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Sleep between loop iterations while the queue is empty.
    #[serde(default = "default_idle_sleep_secs")]
    pub empty_sleep_secs: u64,

    /// Sleep between loop iterations while processing is paused.
    #[serde(default = "default_idle_sleep_secs")]
    pub paused_sleep_secs: u64,

    /// Lower bound of the random inter-task pause.
    #[serde(default = "default_pacing_min_secs")]
    pub pacing_min_secs: u64,

    /// Upper bound of the random inter-task pause.
    #[serde(default = "default_pacing_max_secs")]
    pub pacing_max_secs: u64,

    /// Number of least-loaded candidate accounts the random pick draws from.
    #[serde(default = "default_selection_pool_size")]
    pub selection_pool_size: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            empty_sleep_secs: default_idle_sleep_secs(),
            paused_sleep_secs: default_idle_sleep_secs(),
            pacing_min_secs: default_pacing_min_secs(),
            pacing_max_secs: default_pacing_max_secs(),
            selection_pool_size: default_selection_pool_size(),
        }
    }
}

fn default_max_attempts() -> u32 {
    5
}

fn default_idle_sleep_secs() -> u64 {
    30
}

fn default_pacing_min_secs() -> u64 {
    5
}

fn default_pacing_max_secs() -> u64 {
    10
}

fn default_selection_pool_size() -> usize {
    3
}

/// Browser session expiry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Idle time after which a session is considered expired.
    #[serde(default = "default_idle_expiry_secs")]
    pub idle_expiry_secs: u64,

    /// Interval of the background sweep that closes expired sessions.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_expiry_secs: default_idle_expiry_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_idle_expiry_secs() -> u64 {
    3600
}

fn default_sweep_interval_secs() -> u64 {
    900
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = PricewatchConfig::default();
        assert_eq!(config.agent.name, "pricewatch");
        assert_eq!(config.tracking.capacity_ceiling, 4999);
        assert_eq!(config.queue.max_attempts, 5);
        assert_eq!(config.queue.selection_pool_size, 3);
        assert_eq!(config.session.idle_expiry_secs, 3600);
        assert_eq!(config.session.sweep_interval_secs, 900);
        assert!(config.accounts.is_empty());
    }

    #[test]
    fn accounts_parse_from_toml_sections() {
        let toml_str = r#"
[accounts.Premium]
username = "premium@example.com"
password = "hunter2"

[accounts.Meraxes]
username = "meraxes@example.com"
password = "hunter3"
"#;
        let config: PricewatchConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.accounts.len(), 2);
        // BTreeMap keeps ordering stable (alphabetical).
        let ids: Vec<&String> = config.accounts.keys().collect();
        assert_eq!(ids, ["Meraxes", "Premium"]);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let toml_str = r#"
[queue]
max_attemps = 7
"#;
        assert!(toml::from_str::<PricewatchConfig>(toml_str).is_err());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let toml_str = r#"
[tracking]
capacity_ceiling = 100
"#;
        let config: PricewatchConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.tracking.capacity_ceiling, 100);
        assert_eq!(config.tracking.default_account, "Premium");
    }
}
