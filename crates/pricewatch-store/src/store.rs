// SPDX-FileCopyrightText: 2026 Pricewatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-account tracked-item store.
//!
//! One JSON document per account (`products_<account>.json`) holding a map
//! of item id to [`TrackedItem`]. Mutations update the in-memory cache first
//! and then rewrite the full document, so a crash can lose at most the
//! in-flight write.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use pricewatch_core::{AccountId, ItemId, PricewatchError, TrackedItem};
use tokio::sync::Mutex;
use tracing::{debug, warn};

type ItemMap = HashMap<ItemId, TrackedItem>;

/// Key-value store of tracked items, partitioned by account.
///
/// All mutating and reading operations serialize on one internal lock; the
/// store is cheap to share behind an `Arc`.
pub struct TrackingStore {
    data_dir: PathBuf,
    accounts: Vec<AccountId>,
    cache: Mutex<HashMap<AccountId, ItemMap>>,
}

impl TrackingStore {
    /// Open the store rooted at `data_dir` for the given account set.
    ///
    /// Creates the data directory if it does not exist. Account documents
    /// are loaded lazily on first access.
    pub fn new(
        data_dir: impl Into<PathBuf>,
        accounts: Vec<AccountId>,
    ) -> Result<Self, PricewatchError> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir).map_err(|e| PricewatchError::Store {
            source: Box::new(e),
        })?;
        Ok(Self {
            data_dir,
            accounts,
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// The accounts this store was opened for, in stable order.
    pub fn accounts(&self) -> &[AccountId] {
        &self.accounts
    }

    fn document_path(&self, account: &AccountId) -> PathBuf {
        self.data_dir.join(format!("products_{account}.json"))
    }

    /// Load an account's document from disk, tolerating absent files.
    ///
    /// A corrupt document is logged and treated as empty rather than wedging
    /// every later operation on that account.
    fn load_document(path: &Path, account: &AccountId) -> Result<ItemMap, PricewatchError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ItemMap::new()),
            Err(e) => {
                return Err(PricewatchError::Store {
                    source: Box::new(e),
                });
            }
        };
        match serde_json::from_str(&raw) {
            Ok(map) => Ok(map),
            Err(e) => {
                warn!(account = %account, error = %e, "corrupt store document, starting empty");
                Ok(ItemMap::new())
            }
        }
    }

    async fn write_document(
        &self,
        account: &AccountId,
        items: &ItemMap,
    ) -> Result<(), PricewatchError> {
        let json = serde_json::to_string_pretty(items).map_err(|e| PricewatchError::Store {
            source: Box::new(e),
        })?;
        tokio::fs::write(self.document_path(account), json)
            .await
            .map_err(|e| PricewatchError::Store {
                source: Box::new(e),
            })
    }

    /// Ensure the account's document is cached, loading from disk on first use.
    fn ensure_loaded<'a>(
        &self,
        cache: &'a mut HashMap<AccountId, ItemMap>,
        account: &AccountId,
    ) -> Result<&'a mut ItemMap, PricewatchError> {
        if !cache.contains_key(account) {
            let items = Self::load_document(&self.document_path(account), account)?;
            debug!(account = %account, items = items.len(), "loaded store document");
            cache.insert(account.clone(), items);
        }
        // Just inserted above when absent.
        cache
            .get_mut(account)
            .ok_or_else(|| PricewatchError::Internal("store cache entry vanished".to_string()))
    }

    /// Look up one tracked item.
    pub async fn get(
        &self,
        account: &AccountId,
        item: &ItemId,
    ) -> Result<Option<TrackedItem>, PricewatchError> {
        let mut cache = self.cache.lock().await;
        let items = self.ensure_loaded(&mut cache, account)?;
        Ok(items.get(item).cloned())
    }

    /// Insert or overwrite a tracked item with `last_updated = now`.
    ///
    /// The cache is updated before the disk write; a failed write leaves the
    /// cache ahead of disk until the next successful mutation on the account.
    pub async fn put(
        &self,
        account: &AccountId,
        item: &ItemId,
        price: &str,
        product_title: Option<String>,
    ) -> Result<(), PricewatchError> {
        let mut cache = self.cache.lock().await;
        let items = self.ensure_loaded(&mut cache, account)?;
        items.insert(
            item.clone(),
            TrackedItem {
                price: price.to_string(),
                last_updated: Utc::now(),
                product_title,
            },
        );
        debug!(account = %account, item = %item, price, "stored tracked item");
        // Lock held across the write so documents hit disk in mutation order.
        self.write_document(account, items).await
    }

    /// Remove a tracked item. Returns `false` if it was not present.
    pub async fn delete(
        &self,
        account: &AccountId,
        item: &ItemId,
    ) -> Result<bool, PricewatchError> {
        let mut cache = self.cache.lock().await;
        let items = self.ensure_loaded(&mut cache, account)?;
        if items.remove(item).is_none() {
            return Ok(false);
        }
        debug!(account = %account, item = %item, "deleted tracked item");
        self.write_document(account, items).await?;
        Ok(true)
    }

    /// List tracked items for one account, or the union across all accounts.
    ///
    /// Results are sorted by account then item id so output is stable.
    pub async fn list(
        &self,
        account: Option<&AccountId>,
    ) -> Result<Vec<(AccountId, ItemId, TrackedItem)>, PricewatchError> {
        let targets: Vec<AccountId> = match account {
            Some(id) => vec![id.clone()],
            None => self.accounts.clone(),
        };
        let mut cache = self.cache.lock().await;
        let mut out = Vec::new();
        for id in &targets {
            let items = self.ensure_loaded(&mut cache, id)?;
            for (item, tracked) in items.iter() {
                out.push((id.clone(), item.clone(), tracked.clone()));
            }
        }
        out.sort_by(|a, b| (&a.0, &a.1).cmp(&(&b.0, &b.1)));
        Ok(out)
    }

    /// Number of items currently tracked on one account.
    pub async fn count(&self, account: &AccountId) -> Result<usize, PricewatchError> {
        let mut cache = self.cache.lock().await;
        let items = self.ensure_loaded(&mut cache, account)?;
        Ok(items.len())
    }

    /// Store-wide counters across all configured accounts.
    pub async fn statistics(&self) -> Result<crate::StoreStatistics, PricewatchError> {
        let mut cache = self.cache.lock().await;
        let mut stats = crate::StoreStatistics::default();
        for id in &self.accounts {
            let items = self.ensure_loaded(&mut cache, id)?;
            stats.total += items.len();
            stats.accounts.push(crate::AccountStatistics {
                account: id.clone(),
                tracked: items.len(),
                last_updated: items.values().map(|i| i.last_updated).max(),
            });
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> TrackingStore {
        TrackingStore::new(
            dir.path(),
            vec![AccountId::from("Premium"), AccountId::from("Meraxes")],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let account = AccountId::from("Premium");
        let item = ItemId::new("b000aaaaaa");

        store
            .put(&account, &item, "19.90", Some("Widget".to_string()))
            .await
            .unwrap();

        let got = store.get(&account, &item).await.unwrap().unwrap();
        assert_eq!(got.price, "19.90");
        assert_eq!(got.product_title.as_deref(), Some("Widget"));
    }

    #[tokio::test]
    async fn put_overwrites_and_refreshes_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let account = AccountId::from("Premium");
        let item = ItemId::new("B000AAAAAA");

        store.put(&account, &item, "10.00", None).await.unwrap();
        let first = store.get(&account, &item).await.unwrap().unwrap();

        store.put(&account, &item, "12.50", None).await.unwrap();
        let second = store.get(&account, &item).await.unwrap().unwrap();

        assert_eq!(second.price, "12.50");
        assert!(second.last_updated >= first.last_updated);
        assert_eq!(store.count(&account).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn delete_reports_presence() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let account = AccountId::from("Premium");
        let item = ItemId::new("B000AAAAAA");

        assert!(!store.delete(&account, &item).await.unwrap());
        store.put(&account, &item, "10.00", None).await.unwrap();
        assert!(store.delete(&account, &item).await.unwrap());
        assert!(store.get(&account, &item).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn documents_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let account = AccountId::from("Premium");
        let item = ItemId::new("B000AAAAAA");

        {
            let store = store_in(&dir);
            store.put(&account, &item, "10.00", None).await.unwrap();
        }

        let reopened = store_in(&dir);
        let got = reopened.get(&account, &item).await.unwrap().unwrap();
        assert_eq!(got.price, "10.00");
        assert!(
            dir.path().join("products_Premium.json").exists(),
            "document file should exist on disk"
        );
    }

    #[tokio::test]
    async fn accounts_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let item = ItemId::new("B000AAAAAA");

        store
            .put(&AccountId::from("Premium"), &item, "10.00", None)
            .await
            .unwrap();

        assert!(
            store
                .get(&AccountId::from("Meraxes"), &item)
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(store.count(&AccountId::from("Meraxes")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn list_union_spans_accounts() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store
            .put(
                &AccountId::from("Premium"),
                &ItemId::new("B000BBBBBB"),
                "20.50",
                None,
            )
            .await
            .unwrap();
        store
            .put(
                &AccountId::from("Meraxes"),
                &ItemId::new("B000AAAAAA"),
                "10.00",
                None,
            )
            .await
            .unwrap();

        let all = store.list(None).await.unwrap();
        assert_eq!(all.len(), 2);
        // Sorted by account then item.
        assert_eq!(all[0].0.as_str(), "Meraxes");
        assert_eq!(all[1].0.as_str(), "Premium");

        let premium_only = store
            .list(Some(&AccountId::from("Premium")))
            .await
            .unwrap();
        assert_eq!(premium_only.len(), 1);
        assert_eq!(premium_only[0].1.as_str(), "B000BBBBBB");
    }

    #[tokio::test]
    async fn statistics_aggregate_counts_and_recency() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store
            .put(
                &AccountId::from("Premium"),
                &ItemId::new("B000AAAAAA"),
                "10.00",
                None,
            )
            .await
            .unwrap();
        store
            .put(
                &AccountId::from("Premium"),
                &ItemId::new("B000BBBBBB"),
                "20.50",
                None,
            )
            .await
            .unwrap();

        let stats = store.statistics().await.unwrap();
        assert_eq!(stats.total, 2);
        let premium = stats
            .accounts
            .iter()
            .find(|a| a.account.as_str() == "Premium")
            .unwrap();
        assert_eq!(premium.tracked, 2);
        assert!(premium.last_updated.is_some());
        let meraxes = stats
            .accounts
            .iter()
            .find(|a| a.account.as_str() == "Meraxes")
            .unwrap();
        assert_eq!(meraxes.tracked, 0);
        assert!(meraxes.last_updated.is_none());
        assert_eq!(stats.most_recent(), premium.last_updated);
    }

    #[tokio::test]
    async fn corrupt_document_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("products_Premium.json"), "{not json").unwrap();

        let store = store_in(&dir);
        let account = AccountId::from("Premium");
        assert_eq!(store.count(&account).await.unwrap(), 0);

        // The account remains writable afterwards.
        store
            .put(&account, &ItemId::new("B000AAAAAA"), "10.00", None)
            .await
            .unwrap();
        assert_eq!(store.count(&account).await.unwrap(), 1);
    }
}
