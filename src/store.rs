//! Namespaced fragment store with the staleness gate.
//!
//! Every read opportunistically checks the stored item's modification counter
//! against the current site-wide one, so all cached fragments self-invalidate
//! after any content edit without a separate invalidation sweep.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::backend::CacheBackend;
use crate::error::CacheError;
use crate::item::CacheItem;
use crate::key::{self, KeySpace};

const SOURCE: &str = "memotag::store";

/// Outcome of a cache lookup.
///
/// `Stale` is not an error: it is a hit reclassified as a miss by the
/// staleness gate. Callers recompute in both the `Stale` and `Miss` cases.
#[derive(Debug)]
pub enum Lookup {
    Fresh(CacheItem),
    Stale,
    Miss,
}

/// Cache store scoped to one installation's key namespace.
///
/// Holds an injected backend capability; prefixing, item encoding and the
/// staleness gate live here, the wire protocol lives behind the trait.
pub struct FragmentStore {
    backend: Arc<dyn CacheBackend>,
    keyspace: KeySpace,
}

impl FragmentStore {
    pub fn new(backend: Arc<dyn CacheBackend>, keyspace: KeySpace) -> Self {
        Self { backend, keyspace }
    }

    pub fn keyspace(&self) -> &KeySpace {
        &self.keyspace
    }

    /// Look up a logical key, applying the staleness gate.
    ///
    /// Backend failures and undecodable payloads degrade to a miss. A stale
    /// item is logically deleted so later reads miss without decoding it.
    pub async fn lookup(&self, key: &str, current_lastmod: u64) -> Lookup {
        let namespaced = self.keyspace.namespaced(key);

        let payload = match self.backend.get(&namespaced).await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                debug!(target: SOURCE, key, "cache miss");
                return Lookup::Miss;
            }
            Err(err) => {
                warn!(target: SOURCE, key, error = %err, "backend read failed, treating as miss");
                return Lookup::Miss;
            }
        };

        let item = match CacheItem::decode(&payload) {
            Ok(item) => item,
            Err(err) => {
                warn!(target: SOURCE, key, error = %err, "undecodable cache item, treating as miss");
                return Lookup::Miss;
            }
        };

        if item.is_stale(current_lastmod) {
            debug!(
                target: SOURCE,
                key,
                item_lastmod = ?item.lastmod,
                current_lastmod,
                "cache item stale"
            );
            if let Err(err) = self.backend.delete(&namespaced).await {
                warn!(target: SOURCE, key, error = %err, "failed to delete stale item");
            }
            return Lookup::Stale;
        }

        debug!(target: SOURCE, key, "cache hit");
        Lookup::Fresh(item)
    }

    /// Store an item under its namespaced key with the item's TTL.
    ///
    /// Callers treat failure as best-effort: the freshly computed markup is
    /// returned regardless.
    pub async fn store(&self, item: &CacheItem) -> Result<(), CacheError> {
        key::validate(&item.key)?;

        let payload = item.encode()?;
        self.backend
            .set(&self.keyspace.namespaced(&item.key), payload, item.expires)
            .await
    }

    /// Delete a single logical key.
    pub async fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.backend.delete(&self.keyspace.namespaced(key)).await
    }

    /// Delete every key under this installation's prefix, leaving other
    /// installations' keys untouched. Returns the number of keys deleted.
    pub async fn flush(&self) -> Result<usize, CacheError> {
        let keys = self.backend.keys(self.keyspace.prefix()).await?;
        let mut deleted = 0;

        for namespaced in &keys {
            self.backend.delete(namespaced).await?;
            deleted += 1;
        }

        debug!(target: SOURCE, deleted, "flushed installation keys");
        Ok(deleted)
    }

    /// Decode every item currently stored under this installation's prefix.
    ///
    /// Entries that vanish or fail to decode between listing and fetching are
    /// skipped.
    pub async fn items(&self) -> Result<Vec<CacheItem>, CacheError> {
        let keys = self.backend.keys(self.keyspace.prefix()).await?;
        let mut items = Vec::with_capacity(keys.len());

        for namespaced in &keys {
            let Ok(Some(payload)) = self.backend.get(namespaced).await else {
                continue;
            };
            match CacheItem::decode(&payload) {
                Ok(item) => items.push(item),
                Err(err) => {
                    warn!(target: SOURCE, key = %namespaced, error = %err, "skipping undecodable item");
                }
            }
        }

        Ok(items)
    }
}
