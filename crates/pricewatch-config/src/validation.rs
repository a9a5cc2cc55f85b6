// SPDX-FileCopyrightText: 2026 Pricewatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as credential completeness, pacing interval ordering,
//! and the default account referring to a configured account.

use crate::diagnostic::ConfigError;
use crate::model::PricewatchConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &PricewatchConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // Account credentials must be complete.
    for (id, account) in &config.accounts {
        if account.username.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("accounts.{id}.username must not be empty"),
            });
        }
        if account.password.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("accounts.{id}.password must not be empty"),
            });
        }
    }

    // The default account must be one of the configured accounts.
    if !config.accounts.is_empty()
        && !config.accounts.contains_key(&config.tracking.default_account)
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "tracking.default_account `{}` is not a configured account",
                config.tracking.default_account
            ),
        });
    }

    if config.tracking.capacity_ceiling == 0 {
        errors.push(ConfigError::Validation {
            message: "tracking.capacity_ceiling must be at least 1".to_string(),
        });
    }

    if config.queue.max_attempts == 0 {
        errors.push(ConfigError::Validation {
            message: "queue.max_attempts must be at least 1".to_string(),
        });
    }

    if config.queue.selection_pool_size == 0 {
        errors.push(ConfigError::Validation {
            message: "queue.selection_pool_size must be at least 1".to_string(),
        });
    }

    if config.queue.pacing_min_secs > config.queue.pacing_max_secs {
        errors.push(ConfigError::Validation {
            message: format!(
                "queue.pacing_min_secs ({}) must not exceed queue.pacing_max_secs ({})",
                config.queue.pacing_min_secs, config.queue.pacing_max_secs
            ),
        });
    }

    if config.storage.data_dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.data_dir must not be empty".to_string(),
        });
    }

    if config.storage.queue_file.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.queue_file must not be empty".to_string(),
        });
    }

    if config.session.idle_expiry_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "session.idle_expiry_secs must be at least 1".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AccountConfig;

    #[test]
    fn default_config_validates() {
        // No accounts configured at all is valid for read-only commands.
        let config = PricewatchConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_password_fails_validation() {
        let mut config = PricewatchConfig::default();
        config.accounts.insert(
            "Premium".to_string(),
            AccountConfig {
                username: "premium@example.com".to_string(),
                password: "".to_string(),
            },
        );
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(
            e,
            ConfigError::Validation { message } if message.contains("password")
        )));
    }

    #[test]
    fn default_account_must_be_configured() {
        let mut config = PricewatchConfig::default();
        config.accounts.insert(
            "Meraxes".to_string(),
            AccountConfig {
                username: "m@example.com".to_string(),
                password: "pw".to_string(),
            },
        );
        // tracking.default_account is still "Premium".
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(
            e,
            ConfigError::Validation { message } if message.contains("default_account")
        )));
    }

    #[test]
    fn inverted_pacing_bounds_fail_validation() {
        let mut config = PricewatchConfig::default();
        config.queue.pacing_min_secs = 20;
        config.queue.pacing_max_secs = 10;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(
            e,
            ConfigError::Validation { message } if message.contains("pacing_min_secs")
        )));
    }

    #[test]
    fn zero_ceiling_fails_validation() {
        let mut config = PricewatchConfig::default();
        config.tracking.capacity_ceiling = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(
            e,
            ConfigError::Validation { message } if message.contains("capacity_ceiling")
        )));
    }
}
