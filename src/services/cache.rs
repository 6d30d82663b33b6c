use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::models::profile::{normalize_id, Profile};
use crate::services::store::{ProfileStore, StoreResult};

struct CacheEntry {
    loaded_at: Instant,
    profiles: HashMap<String, Profile>,
}

/// Short-lived read cache in front of another profile store.
///
/// Entries are keyed by the normalized identifier set of a request and expire
/// after `ttl`. There is no write-through; expiry is the only invalidation.
pub struct CachedProfileStore {
    inner: Arc<dyn ProfileStore>,
    ttl: Duration,
    entries: Mutex<HashMap<Vec<String>, CacheEntry>>,
}

impl CachedProfileStore {
    pub fn new(inner: Arc<dyn ProfileStore>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    // Sorted, deduplicated, normalized identifiers
    fn cache_key(ids: &[String]) -> Vec<String> {
        let mut key: Vec<String> = ids.iter().map(|id| normalize_id(id)).collect();
        key.sort();
        key.dedup();
        key
    }

    fn lookup(&self, key: &[String]) -> Option<HashMap<String, Profile>> {
        let Ok(mut entries) = self.entries.lock() else {
            warn!("Profile cache mutex poisoned, bypassing cache");
            return None;
        };

        match entries.get(key) {
            Some(entry) if entry.loaded_at.elapsed() < self.ttl => Some(entry.profiles.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn store(&self, key: Vec<String>, profiles: HashMap<String, Profile>) {
        if let Ok(mut entries) = self.entries.lock() {
            let ttl = self.ttl;
            entries.retain(|_, entry| entry.loaded_at.elapsed() < ttl);
            entries.insert(
                key,
                CacheEntry {
                    loaded_at: Instant::now(),
                    profiles,
                },
            );
        }
    }

    /// Number of live (unexpired) entries
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .map(|entries| {
                entries
                    .values()
                    .filter(|entry| entry.loaded_at.elapsed() < self.ttl)
                    .count()
            })
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ProfileStore for CachedProfileStore {
    async fn load_profiles(&self, ids: &[String]) -> StoreResult<HashMap<String, Profile>> {
        let key = Self::cache_key(ids);

        if let Some(profiles) = self.lookup(&key) {
            debug!("Profile cache hit for {:?}", key);
            return Ok(profiles);
        }

        debug!("Profile cache miss for {:?}", key);
        let profiles = self.inner.load_profiles(ids).await?;
        self.store(key, profiles.clone());
        Ok(profiles)
    }
}
