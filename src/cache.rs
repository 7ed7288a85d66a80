//! TTL-bounded LRU cache for analysis results.
//!
//! Graph analyses walk the whole edge table, so repeated queries against an
//! unchanged index are pure waste. Entries carry both an LRU position and a
//! per-entry deadline; a stale entry is dropped on access rather than by a
//! background sweeper.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;

const DEFAULT_CAPACITY: usize = 128;
const DEFAULT_TTL: Duration = Duration::from_secs(300);

struct Entry<T> {
    value: T,
    expires_at: Instant,
}

pub struct ResultCache<T> {
    inner: Mutex<LruCache<String, Entry<T>>>,
    ttl: Duration,
}

impl<T: Clone> ResultCache<T> {
    pub fn new() -> Self {
        Self::with_config(DEFAULT_CAPACITY, DEFAULT_TTL)
    }

    pub fn with_config(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap();
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    pub fn get(&self, key: &str) -> Option<T> {
        let mut cache = self.inner.lock();
        match cache.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                cache.pop(key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, key: String, value: T) {
        let entry = Entry {
            value,
            expires_at: Instant::now() + self.ttl,
        };
        self.inner.lock().put(key, entry);
    }

    /// Drop every expired entry. Callers running long-lived servers can
    /// invoke this periodically; short-lived processes never need to.
    pub fn cleanup_expired(&self) -> usize {
        let mut cache = self.inner.lock();
        let now = Instant::now();
        let stale: Vec<String> = cache
            .iter()
            .filter(|(_, e)| e.expires_at <= now)
            .map(|(k, _)| k.clone())
            .collect();
        let removed = stale.len();
        for key in stale {
            cache.pop(&key);
        }
        removed
    }

    pub fn invalidate_all(&self) {
        self.inner.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl<T: Clone> Default for ResultCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Stable cache key for an analysis invocation: the operation name plus a
/// fingerprint of its parameters.
pub fn cache_key(operation: &str, params: &impl serde::Serialize) -> String {
    let encoded = serde_json::to_vec(params).unwrap_or_default();
    let digest = blake3::hash(&encoded);
    format!("{operation}:{}", digest.to_hex())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_get() {
        let cache: ResultCache<Vec<u32>> = ResultCache::new();
        cache.put("a".into(), vec![1, 2, 3]);
        assert_eq!(cache.get("a"), Some(vec![1, 2, 3]));
        assert_eq!(cache.get("missing"), None);
    }

    #[test]
    fn test_expiry() {
        let cache: ResultCache<u32> = ResultCache::with_config(8, Duration::from_millis(0));
        cache.put("a".into(), 7);
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get("a"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_lru_eviction() {
        let cache: ResultCache<u32> = ResultCache::with_config(2, DEFAULT_TTL);
        cache.put("a".into(), 1);
        cache.put("b".into(), 2);
        cache.put("c".into(), 3);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(2));
        assert_eq!(cache.get("c"), Some(3));
    }

    #[test]
    fn test_cleanup_expired() {
        let cache: ResultCache<u32> = ResultCache::with_config(8, Duration::from_millis(0));
        cache.put("a".into(), 1);
        cache.put("b".into(), 2);
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.cleanup_expired(), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_all() {
        let cache: ResultCache<u32> = ResultCache::new();
        cache.put("a".into(), 1);
        cache.invalidate_all();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_key_is_stable() {
        #[derive(serde::Serialize)]
        struct P {
            depth: u32,
        }
        let a = cache_key("impact", &P { depth: 3 });
        let b = cache_key("impact", &P { depth: 3 });
        let c = cache_key("impact", &P { depth: 4 });
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("impact:"));
    }
}
