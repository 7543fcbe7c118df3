//! In-memory TTL cache for GET responses
//!
//! Entries are keyed by `METHOD:endpoint` and expire a fixed time after
//! insertion. Expired entries are evicted lazily on the next read.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

/// How long a cached GET response stays live (5 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_millis(300_000);

/// A cached response and when it was stored
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub data: T,
    pub timestamp: Instant,
}

/// Time-bounded cache map
#[derive(Debug)]
pub struct TtlCache<T> {
    entries: HashMap<String, CacheEntry<T>>,
    ttl: Duration,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    /// Returns a clone of the live entry for `key`
    ///
    /// An entry whose age has reached the TTL is removed and reported as absent.
    pub fn get(&mut self, key: &str) -> Option<T> {
        let entry = self.entries.get(key)?;
        if entry.timestamp.elapsed() < self.ttl {
            return Some(entry.data.clone());
        }
        self.entries.remove(key);
        None
    }

    /// Stores `data` under `key` with the current timestamp
    pub fn insert(&mut self, key: impl Into<String>, data: T) {
        self.entries.insert(
            key.into(),
            CacheEntry {
                data,
                timestamp: Instant::now(),
            },
        );
    }

    /// Removes every entry, or only the keys containing `pattern`
    ///
    /// Returns the number of entries removed.
    pub fn clear(&mut self, pattern: Option<&str>) -> usize {
        let before = self.entries.len();
        match pattern {
            None => self.entries.clear(),
            Some(pattern) => self.entries.retain(|key, _| !key.contains(pattern)),
        }
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Clone> Default for TtlCache<T> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
