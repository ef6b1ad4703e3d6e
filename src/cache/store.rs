//! In-memory TTL store.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};
use tracing::debug;

use super::ttl::TtlPreset;

#[derive(Debug, Clone)]
struct CacheEntry {
    data: Value,
    // None when `now + ttl` is past what `Instant` can represent: never expires.
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(data: Value, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: Instant::now().checked_add(ttl),
        }
    }

    // Live while now <= expires_at.
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.map_or(false, |at| now > at)
    }
}

/// Live entry count and keys, as reported by [`CacheStore::stats`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub keys: Vec<String>,
}

/// Key/value store with per-entry absolute expiry.
///
/// Expired entries are dropped lazily when read, or eagerly by [`CacheStore::cleanup`].
/// There is no size bound.
pub struct CacheStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
    default_ttl: Duration,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::with_default_ttl(TtlPreset::Short.duration())
    }

    pub fn with_default_ttl(default_ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.write();
        let entry = entries.get(key)?;
        if entry.is_expired(Instant::now()) {
            entries.remove(key);
            debug!(key, "cache entry expired");
            return None;
        }
        Some(entry.data.clone())
    }

    /// Store `value`, replacing any previous entry. `None` uses the default TTL.
    pub fn set(&self, key: impl Into<String>, value: Value, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        self.write().insert(key.into(), CacheEntry::new(value, ttl));
    }

    /// Whether `key` holds a live entry. Expired entries are removed.
    pub fn has(&self, key: &str) -> bool {
        let mut entries = self.write();
        match entries.get(key) {
            Some(entry) if entry.is_expired(Instant::now()) => {
                entries.remove(key);
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    pub fn delete(&self, key: &str) {
        self.write().remove(key);
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    /// Remove every expired entry. Returns how many were dropped.
    pub fn cleanup(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired(now));
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, "cache cleanup");
        }
        removed
    }

    pub fn stats(&self) -> CacheStats {
        self.cleanup();
        let mut keys: Vec<String> = self.read().keys().cloned().collect();
        keys.sort();
        CacheStats {
            size: keys.len(),
            keys,
        }
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ttl_from_minutes;
    use serde_json::json;
    use std::thread::sleep;

    #[test]
    fn test_set_then_get_round_trip() {
        let cache = CacheStore::new();
        let value = json!([{"id": 35, "sigla": "SP", "nome": "São Paulo"}]);
        cache.set("estados", value.clone(), None);
        assert_eq!(cache.get("estados"), Some(value));
        assert!(cache.has("estados"));
        assert_eq!(cache.get("missing"), None);
    }

    #[test]
    fn test_entry_expires() {
        let cache = CacheStore::new();
        cache.set("k", json!("v"), Some(ttl_from_minutes(0.001)));
        assert_eq!(cache.get("k"), Some(json!("v")));
        sleep(Duration::from_millis(100));
        assert_eq!(cache.get("k"), None);
        assert!(!cache.has("k"));
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_set_replaces_entry() {
        let cache = CacheStore::new();
        cache.set("k", json!({"a": 1}), None);
        cache.set("k", json!({"b": 2}), None);
        assert_eq!(cache.get("k"), Some(json!({"b": 2})));
    }

    #[test]
    fn test_replacing_resets_expiry() {
        let cache = CacheStore::new();
        cache.set("k", json!(1), Some(Duration::from_millis(30)));
        cache.set("k", json!(2), Some(Duration::from_secs(60)));
        sleep(Duration::from_millis(60));
        assert_eq!(cache.get("k"), Some(json!(2)));
    }

    #[test]
    fn test_delete_and_clear() {
        let cache = CacheStore::new();
        cache.set("a", json!(1), None);
        cache.set("b", json!(2), None);
        cache.delete("a");
        cache.delete("never-set");
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(json!(2)));

        cache.set("c", json!(3), None);
        cache.clear();
        for key in ["a", "b", "c"] {
            assert_eq!(cache.get(key), None);
        }
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cleanup_removes_only_expired() {
        let cache = CacheStore::new();
        cache.set("short-1", json!(1), Some(Duration::from_millis(20)));
        cache.set("short-2", json!(2), Some(Duration::from_millis(20)));
        cache.set("long", json!(3), Some(Duration::from_secs(60)));
        sleep(Duration::from_millis(60));

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.cleanup(), 2);
        assert_eq!(cache.cleanup(), 0);
        assert_eq!(cache.get("long"), Some(json!(3)));

        let stats = cache.stats();
        assert_eq!(stats.size, 1);
        assert_eq!(stats.keys, vec!["long".to_string()]);
    }

    #[test]
    fn test_stats_runs_cleanup() {
        let cache = CacheStore::with_default_ttl(Duration::from_millis(20));
        cache.set("b", json!(1), None);
        cache.set("a", json!(2), Some(Duration::from_secs(60)));
        cache.set("c", json!(3), Some(Duration::from_secs(60)));
        sleep(Duration::from_millis(60));

        let stats = cache.stats();
        assert_eq!(stats.size, 2);
        assert_eq!(stats.keys, vec!["a".to_string(), "c".to_string()]);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_saturated_ttl_never_expires() {
        let cache = CacheStore::new();
        cache.set("forever", json!({"id": 1}), Some(Duration::MAX));
        cache.set("huge", json!({"id": 2}), Some(ttl_from_minutes(1e20)));
        assert_eq!(cache.get("forever"), Some(json!({"id": 1})));
        assert!(cache.has("huge"));
        assert_eq!(cache.cleanup(), 0);
        assert_eq!(cache.stats().size, 2);
    }

    #[test]
    fn test_default_ttl_is_fifteen_minutes() {
        assert_eq!(CacheStore::new().default_ttl(), Duration::from_secs(15 * 60));
    }
}
