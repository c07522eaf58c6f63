use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::Duration;

use axum::http::response::Parts;
use bytes::Bytes;
use lru::LruCache;
use metrics::counter;
use tokio::time::Instant;

use crate::application::pagination::PageNumber;
use crate::config::CacheSettings;

use super::lock::lock_recovering;

/// Identity of a cached page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// The global feed at one requested page number.
    GlobalFeed { page: PageNumber },
}

/// A fully buffered response ready to be replayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl CachedResponse {
    pub fn from_parts(parts: &Parts, body: Bytes) -> Self {
        Self {
            status: parts.status.as_u16(),
            headers: parts
                .headers
                .iter()
                .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.to_string(), s.to_string())))
                .collect(),
            body,
        }
    }
}

struct Entry {
    value: CachedResponse,
    expires_at: Instant,
}

/// Bounded TTL cache of rendered pages.
///
/// Entries live until their TTL elapses or capacity pressure evicts the least
/// recently used one. Content writes never touch the cache.
pub struct PageCache {
    entries: Mutex<LruCache<CacheKey, Entry>>,
    ttl: Duration,
}

impl PageCache {
    pub fn new(capacity: NonZeroUsize, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    pub fn from_settings(settings: &CacheSettings) -> Self {
        Self::new(settings.max_entries, settings.ttl)
    }

    /// Default time-to-live applied by the feed middleware.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &CacheKey) -> Option<CachedResponse> {
        let now = Instant::now();
        let mut entries = lock_recovering(&self.entries, "get");

        let lookup = entries
            .get(key)
            .map(|entry| (entry.expires_at > now).then(|| entry.value.clone()));

        match lookup {
            Some(Some(value)) => {
                counter!("yatube_page_cache_hit_total").increment(1);
                Some(value)
            }
            Some(None) => {
                entries.pop(key);
                counter!("yatube_page_cache_expired_total").increment(1);
                counter!("yatube_page_cache_miss_total").increment(1);
                None
            }
            None => {
                counter!("yatube_page_cache_miss_total").increment(1);
                None
            }
        }
    }

    pub fn put(&self, key: CacheKey, value: CachedResponse, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        let mut entries = lock_recovering(&self.entries, "put");

        if entries.len() == entries.cap().get() && !entries.contains(&key) {
            counter!("yatube_page_cache_evict_total").increment(1);
        }
        entries.put(key, Entry { value, expires_at });
    }

    /// Drop every entry.
    pub fn clear(&self) {
        lock_recovering(&self.entries, "clear").clear();
    }

    /// Number of stored entries, expired ones included until next touched.
    pub fn len(&self) -> usize {
        lock_recovering(&self.entries, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
