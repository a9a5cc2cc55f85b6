// SPDX-FileCopyrightText: 2026 Pricewatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Account registry: the fixed, ordered set of tracking-service accounts.
//!
//! Built once from configuration at startup and read-only afterwards.
//! An unknown account identifier is a configuration error, never a
//! retryable runtime failure.

use pricewatch_core::{Account, AccountId, PricewatchError};

use crate::model::PricewatchConfig;

/// The fixed set of configured accounts, in stable (alphabetical) order.
#[derive(Debug, Clone)]
pub struct AccountRegistry {
    accounts: Vec<Account>,
    default_id: AccountId,
}

impl AccountRegistry {
    /// Build the registry from a loaded configuration.
    ///
    /// Requires at least one account and a default account that names one
    /// of them (both also checked by config validation; this guards direct
    /// construction from unvalidated configs).
    pub fn from_config(config: &PricewatchConfig) -> Result<Self, PricewatchError> {
        if config.accounts.is_empty() {
            return Err(PricewatchError::Config(
                "no accounts configured; add at least one [accounts.<id>] section".to_string(),
            ));
        }

        let accounts: Vec<Account> = config
            .accounts
            .iter()
            .map(|(id, creds)| Account {
                id: AccountId(id.clone()),
                username: creds.username.clone(),
                password: creds.password.clone(),
                capacity_ceiling: config.tracking.capacity_ceiling,
            })
            .collect();

        let default_id = AccountId(config.tracking.default_account.clone());
        if !accounts.iter().any(|a| a.id == default_id) {
            return Err(PricewatchError::Config(format!(
                "default account `{default_id}` is not a configured account"
            )));
        }

        Ok(Self {
            accounts,
            default_id,
        })
    }

    /// All configured accounts, in stable order.
    pub fn list(&self) -> &[Account] {
        &self.accounts
    }

    /// Look up one account by identifier.
    pub fn get(&self, id: &AccountId) -> Result<&Account, PricewatchError> {
        self.accounts
            .iter()
            .find(|a| &a.id == id)
            .ok_or_else(|| PricewatchError::AccountNotFound {
                name: id.to_string(),
            })
    }

    /// The account used when a request names none.
    pub fn get_default(&self) -> &Account {
        // from_config guarantees the default is present.
        self.accounts
            .iter()
            .find(|a| a.id == self.default_id)
            .unwrap_or(&self.accounts[0])
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
