// SPDX-FileCopyrightText: 2026 Pricewatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for Pricewatch.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup, environment variable
//! overrides, diagnostic error rendering with typo suggestions, and the
//! account registry built from the loaded configuration.
//!
//! # Usage
//!
//! ```no_run
//! use pricewatch_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("Process name: {}", config.agent.name);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod registry;
pub mod validation;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::PricewatchConfig;
pub use registry::AccountRegistry;

/// Load configuration from the XDG hierarchy and validate it.
///
/// This is the high-level entry point that:
/// 1. Loads config from TOML files + env vars via Figment
/// 2. On success: runs post-deserialization validation
/// 3. On Figment error: converts to miette diagnostics with typo suggestions
///
/// Returns either a valid `PricewatchConfig` or a list of diagnostic errors.
pub fn load_and_validate() -> Result<PricewatchConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err)),
    }
}

/// Load configuration from a TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<PricewatchConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err)),
    }
}
