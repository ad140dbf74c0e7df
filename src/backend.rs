//! Cache backend capability.
//!
//! The store holds an injected backend behind this trait rather than
//! extending a concrete client type; any key-value client with get/set/delete
//! and prefix listing slots in. `MemoryBackend` is the in-process
//! implementation used by tests and embedded deployments.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockWriteGuard};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::warn;

use crate::error::CacheError;

/// Minimal key-value capability the cache layer needs.
///
/// Overwrite semantics are plain last-write-wins; atomicity of concurrent
/// writers to one key is the backend's concern, not this layer's.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Fetch a value. `Ok(None)` is a miss.
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError>;

    /// Store a value with a TTL in seconds; 0 means no expiry.
    async fn set(&self, key: &str, value: Bytes, ttl_seconds: u32) -> Result<(), CacheError>;

    /// Delete a value. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// List all stored keys starting with `prefix`.
    async fn keys(&self, prefix: &str) -> Result<Vec<String>, CacheError>;
}

struct Entry {
    value: Bytes,
    deadline: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        matches!(self.deadline, Some(deadline) if deadline <= now)
    }
}

/// In-process backend with TTL support and last-write-wins overwrites.
#[derive(Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    // Expired entries are dropped lazily on access, so every operation takes
    // the write guard.
    fn entries_mut(&self) -> RwLockWriteGuard<'_, HashMap<String, Entry>> {
        match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!(
                    lock_kind = "rwlock.write",
                    result = "poisoned_recovered",
                    "Recovered from poisoned memory backend lock"
                );
                poisoned.into_inner()
            }
        }
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        let mut entries = self.entries_mut();

        match entries.get(key) {
            Some(entry) if entry.is_expired(Instant::now()) => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Bytes, ttl_seconds: u32) -> Result<(), CacheError> {
        let deadline = match ttl_seconds {
            0 => None,
            secs => Some(Instant::now() + Duration::from_secs(u64::from(secs))),
        };

        self.entries_mut()
            .insert(key.to_string(), Entry { value, deadline });
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries_mut().remove(key);
        Ok(())
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>, CacheError> {
        let now = Instant::now();
        let entries = self.entries_mut();

        Ok(entries
            .iter()
            .filter(|(key, entry)| key.starts_with(prefix) && !entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect())
    }
}
