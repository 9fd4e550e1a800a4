//! Cache Storage Module
//!
//! Named cache stores mapping request identity to the latest stored response.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::cache::{RequestKey, StoredResponse};
use crate::error::Result;

// == Cache Storage Trait ==
/// Handle to every named cache store owned by the agent.
///
/// Writes to distinct keys are independent; concurrent writes to the same key
/// are last-writer-wins.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Opens the named store, creating it empty if absent.
    async fn open(&self, name: &str) -> Result<()>;

    /// Stores `response` under `key`, replacing any prior entry. Creates the
    /// store if needed.
    async fn put(&self, name: &str, key: RequestKey, response: StoredResponse) -> Result<()>;

    /// Stores every entry or none of them.
    async fn put_all(&self, name: &str, entries: Vec<(RequestKey, StoredResponse)>)
        -> Result<()>;

    /// Looks `key` up in one store.
    async fn match_in(&self, name: &str, key: &RequestKey) -> Result<Option<StoredResponse>>;

    /// Names of every existing store.
    async fn keys(&self) -> Result<Vec<String>>;

    /// Deletes a whole store. Returns false if it did not exist.
    async fn delete(&self, name: &str) -> Result<bool>;

    /// Number of entries in a store, None if it does not exist.
    async fn entry_count(&self, name: &str) -> Result<Option<usize>>;

    /// Looks `key` up in each store in turn; the first hit wins.
    async fn match_any(&self, names: &[String], key: &RequestKey) -> Result<Option<StoredResponse>> {
        for name in names {
            if let Some(response) = self.match_in(name, key).await? {
                return Ok(Some(response));
            }
        }
        Ok(None)
    }
}

// == Memory Storage ==
/// In-process cache storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    /// Store name -> entries
    stores: RwLock<BTreeMap<String, HashMap<RequestKey, StoredResponse>>>,
}

impl MemoryStorage {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStorage for MemoryStorage {
    async fn open(&self, name: &str) -> Result<()> {
        self.stores
            .write()
            .await
            .entry(name.to_string())
            .or_default();
        Ok(())
    }

    async fn put(&self, name: &str, key: RequestKey, response: StoredResponse) -> Result<()> {
        self.stores
            .write()
            .await
            .entry(name.to_string())
            .or_default()
            .insert(key, response);
        Ok(())
    }

    async fn put_all(
        &self,
        name: &str,
        entries: Vec<(RequestKey, StoredResponse)>,
    ) -> Result<()> {
        // Single lock acquisition: readers see all entries or none.
        let mut stores = self.stores.write().await;
        let store = stores.entry(name.to_string()).or_default();
        store.extend(entries);
        Ok(())
    }

    async fn match_in(&self, name: &str, key: &RequestKey) -> Result<Option<StoredResponse>> {
        let stores = self.stores.read().await;
        Ok(stores.get(name).and_then(|store| store.get(key)).cloned())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.stores.read().await.keys().cloned().collect())
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        Ok(self.stores.write().await.remove(name).is_some())
    }

    async fn entry_count(&self, name: &str) -> Result<Option<usize>> {
        Ok(self.stores.read().await.get(name).map(HashMap::len))
    }
}
