//! A bounded, expiring key-value map.
//!
//! [`TtlStore`] backs the access-token, session and price stores. Each entry
//! carries its own deadline; reads treat an entry at or past its deadline as
//! absent and drop it. Inserts into a full store first purge expired entries
//! and then evict the entry closest to expiry. Inserts that may evict are
//! serialized, so the store never holds more than its capacity.

use dashmap::DashMap;
use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// A stored value and the instant it stops being readable.
///
/// `None` means the TTL reaches past what [`Instant`] can represent.
#[derive(Clone, Debug)]
struct Entry<V> {
    value: V,
    expires_at: Option<Instant>,
}

impl<V> Entry<V> {
    fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|deadline| now < deadline)
    }

    /// Orders entries by expiry, never-expiring ones last.
    fn eviction_key(&self) -> (bool, Option<Instant>) {
        (self.expires_at.is_none(), self.expires_at)
    }
}

/// Concurrent map whose entries expire after a fixed TTL.
///
/// A TTL of zero makes every entry stale as soon as it is written.
pub struct TtlStore<K, V> {
    ttl: Duration,
    capacity: usize,
    entries: DashMap<K, Entry<V>>,
    insert_lock: Mutex<()>,
}

impl<K, V> fmt::Debug for TtlStore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlStore")
            .field("ttl", &self.ttl)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl<K, V> TtlStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Default maximum number of live entries.
    pub const DEFAULT_CAPACITY: usize = 10_000;

    /// Creates a store with the given TTL and capacity (at least one entry).
    #[must_use]
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity: capacity.max(1),
            entries: DashMap::new(),
            insert_lock: Mutex::new(()),
        }
    }

    /// Returns the configured TTL.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the configured capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries currently held, including ones not yet purged.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts or replaces a value, restarting its TTL.
    pub fn insert(&self, key: K, value: V) {
        let _guard = self.insert_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.purge_expired();
            if self.entries.len() >= self.capacity {
                self.evict_oldest();
            }
        }
        let expires_at = self.deadline(Instant::now());
        self.entries.insert(key, Entry { value, expires_at });
    }

    /// Returns a clone of the value if it is still fresh.
    ///
    /// Expired entries are removed.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let now = Instant::now();
        if self.remove_expired(key, now) {
            return None;
        }
        self.entries
            .get(key)
            .filter(|entry| entry.is_fresh(now))
            .map(|entry| entry.value.clone())
    }

    /// Removes the entry and returns it only if it was fresh.
    ///
    /// Removal is atomic, so concurrent callers never both receive the value.
    pub fn take<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let now = Instant::now();
        self.entries
            .remove(key)
            .and_then(|(_, entry)| entry.is_fresh(now).then_some(entry.value))
    }

    /// Applies `f` to a fresh value, restarts its TTL and returns the updated value.
    ///
    /// Expired entries are removed and `f` is not called.
    pub fn update<Q, F>(&self, key: &Q, f: F) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
        F: FnOnce(&mut V),
    {
        let now = Instant::now();
        if self.remove_expired(key, now) {
            return None;
        }
        let mut entry = self.entries.get_mut(key)?;
        if !entry.is_fresh(now) {
            return None;
        }
        f(&mut entry.value);
        entry.expires_at = self.deadline(now);
        Some(entry.value.clone())
    }

    /// Restarts the TTL of a fresh entry.
    pub fn touch<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.update(key, |_| {})
    }

    /// Removes an entry regardless of freshness.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.remove(key).map(|(_, entry)| entry.value)
    }

    /// Drops all expired entries and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_fresh(now));
        before.saturating_sub(self.entries.len())
    }

    fn deadline(&self, now: Instant) -> Option<Instant> {
        now.checked_add(self.ttl)
    }

    fn remove_expired<Q>(&self, key: &Q, now: Instant) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries
            .remove_if(key, |_, entry| !entry.is_fresh(now))
            .is_some()
    }

    fn evict_oldest(&self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.value().eviction_key())
            .map(|entry| entry.key().clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
            #[cfg(feature = "telemetry")]
            tracing::debug!(capacity = self.capacity, "evicted oldest entry from full store");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    fn store(ttl: Duration, capacity: usize) -> TtlStore<String, u32> {
        TtlStore::new(ttl, capacity)
    }

    #[test]
    fn test_get_returns_fresh_value() {
        let s = store(Duration::from_secs(60), 8);
        s.insert("a".to_owned(), 1);
        assert_eq!(s.get("a"), Some(1));
        assert_eq!(s.get("a"), Some(1));
    }

    #[test]
    fn test_expired_value_is_absent_and_removed() {
        let s = store(Duration::from_millis(5), 8);
        s.insert("a".to_owned(), 1);
        sleep(Duration::from_millis(20));
        assert_eq!(s.get("a"), None);
        assert!(s.is_empty());
    }

    #[test]
    fn test_zero_ttl_is_never_readable() {
        let s = store(Duration::ZERO, 8);
        s.insert("a".to_owned(), 1);
        assert_eq!(s.get("a"), None);
        assert_eq!(s.take("a"), None);
    }

    #[test]
    fn test_take_is_one_shot() {
        let s = store(Duration::from_secs(60), 8);
        s.insert("a".to_owned(), 7);
        assert_eq!(s.take("a"), Some(7));
        assert_eq!(s.take("a"), None);
        assert_eq!(s.get("a"), None);
    }

    #[test]
    fn test_update_slides_expiry() {
        let s = store(Duration::from_millis(200), 8);
        s.insert("a".to_owned(), 1);
        sleep(Duration::from_millis(120));
        assert_eq!(s.update("a", |v| *v += 1), Some(2));
        sleep(Duration::from_millis(120));
        // 240ms after insert, 120ms after the update.
        assert_eq!(s.get("a"), Some(2));
    }

    #[test]
    fn test_update_on_expired_entry_does_not_run() {
        let s = store(Duration::from_millis(5), 8);
        s.insert("a".to_owned(), 1);
        sleep(Duration::from_millis(20));
        let mut called = false;
        assert_eq!(s.update("a", |_| called = true), None);
        assert!(!called);
    }

    #[test]
    fn test_full_store_evicts_oldest() {
        let s = store(Duration::from_secs(60), 2);
        s.insert("a".to_owned(), 1);
        sleep(Duration::from_millis(2));
        s.insert("b".to_owned(), 2);
        sleep(Duration::from_millis(2));
        s.insert("c".to_owned(), 3);
        assert_eq!(s.len(), 2);
        assert_eq!(s.get("a"), None);
        assert_eq!(s.get("b"), Some(2));
        assert_eq!(s.get("c"), Some(3));
    }

    #[test]
    fn test_full_store_prefers_purging_expired() {
        let s: TtlStore<String, u32> = TtlStore::new(Duration::from_millis(30), 2);
        s.insert("a".to_owned(), 1);
        sleep(Duration::from_millis(40));
        s.insert("b".to_owned(), 2);
        s.insert("c".to_owned(), 3);
        assert_eq!(s.get("b"), Some(2));
        assert_eq!(s.get("c"), Some(3));
    }

    #[test]
    fn test_replacing_existing_key_does_not_evict() {
        let s = store(Duration::from_secs(60), 2);
        s.insert("a".to_owned(), 1);
        s.insert("b".to_owned(), 2);
        s.insert("a".to_owned(), 10);
        assert_eq!(s.get("a"), Some(10));
        assert_eq!(s.get("b"), Some(2));
    }

    #[test]
    fn test_purge_expired_counts_removed() {
        let s = store(Duration::from_millis(5), 8);
        s.insert("a".to_owned(), 1);
        s.insert("b".to_owned(), 2);
        sleep(Duration::from_millis(20));
        assert_eq!(s.purge_expired(), 2);
        assert!(s.is_empty());
    }

    #[test]
    fn test_unbounded_ttl_never_expires() {
        let s = store(Duration::MAX, 8);
        s.insert("a".to_owned(), 1);
        assert_eq!(s.update("a", |v| *v += 1), Some(2));
        assert_eq!(s.touch("a"), Some(2));
        assert_eq!(s.purge_expired(), 0);
        assert_eq!(s.take("a"), Some(2));
    }

    #[test]
    fn test_unbounded_ttl_still_evicts_when_full() {
        let s = store(Duration::MAX, 1);
        s.insert("a".to_owned(), 1);
        s.insert("b".to_owned(), 2);
        assert_eq!(s.len(), 1);
        assert_eq!(s.get("b"), Some(2));
    }

    #[test]
    fn test_concurrent_inserts_respect_capacity() {
        let s = std::sync::Arc::new(store(Duration::from_secs(60), 4));
        let workers: Vec<_> = (0..8)
            .map(|t| {
                let s = std::sync::Arc::clone(&s);
                std::thread::spawn(move || {
                    for i in 0..200 {
                        s.insert(format!("{t}-{i}"), i);
                        assert!(s.len() <= 4);
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        assert_eq!(s.len(), 4);
    }

    #[test]
    fn test_capacity_is_at_least_one() {
        let s = store(Duration::from_secs(1), 0);
        assert_eq!(s.capacity(), 1);
    }
}
