//! In-process TTL cache used by upstream-call sites.
//!
//! Every component that talks to an origin (metadata service, provider
//! adapters) owns one of these to avoid redundant network traffic. Entries
//! expire lazily on read; there is no background sweep and no size bound,
//! since keys come from a small practical space of (title, year) queries.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// A cached value together with its expiry deadline.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Generic key/value cache with a fixed time-to-live per cache instance.
///
/// Interior mutability behind a `Mutex` so a shared instance can be hit from
/// concurrent search tasks. Two tasks racing to populate the same key do
/// redundant upstream work at worst; last write wins.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
    ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Create a cache whose entries live for `ttl` after insertion.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Store a value under `key`, replacing any previous entry and resetting
    /// its deadline.
    pub fn insert(&self, key: K, value: V) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries
            .lock()
            .expect("cache mutex poisoned")
            .insert(key, entry);
    }

    /// Fetch a live value. An entry past its deadline behaves as a miss and
    /// is removed.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Non-destructive presence check with the same expiry rule as `get`.
    pub fn contains(&self, key: &K) -> bool {
        let entries = self.entries.lock().expect("cache mutex poisoned");
        entries
            .get(key)
            .is_some_and(|entry| entry.expires_at > Instant::now())
    }

    /// Number of stored entries, expired ones included until they are read.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache mutex poisoned").len()
    }

    /// True when no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
