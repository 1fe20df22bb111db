//! Bounded, expiring in-memory cache shared by the HTTP adapters.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Entry<V> {
    fetched_at: Instant,
    value: V,
}

/// Entries older than `max_age` are never served, and the oldest entries
/// are evicted once more than `max_entries` are held.
#[derive(Debug)]
pub(crate) struct ExpiringCache<K, V> {
    entries: Mutex<HashMap<K, Entry<V>>>,
    max_age: Duration,
    max_entries: usize,
}

impl<K, V> ExpiringCache<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    pub(crate) fn new(max_age: Duration, max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_age,
            max_entries,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, Entry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let mut entries = self.lock();
        let fresh = entries
            .get(key)
            .map(|entry| entry.fetched_at.elapsed() < self.max_age)?;
        if fresh {
            entries.get(key).map(|entry| entry.value.clone())
        } else {
            entries.remove(key);
            None
        }
    }

    pub(crate) fn insert(&self, key: K, value: V) {
        if self.max_entries == 0 {
            return;
        }
        let mut entries = self.lock();
        entries.insert(
            key,
            Entry {
                fetched_at: Instant::now(),
                value,
            },
        );
        self.prune(&mut entries);
    }

    fn prune(&self, entries: &mut HashMap<K, Entry<V>>) {
        entries.retain(|_, entry| entry.fetched_at.elapsed() < self.max_age);
        if entries.len() <= self.max_entries {
            return;
        }
        let mut by_age: Vec<(K, Instant)> = entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.fetched_at))
            .collect();
        by_age.sort_by_key(|(_, fetched_at)| *fetched_at);
        let excess = entries.len() - self.max_entries;
        for (key, _) in by_age.into_iter().take(excess) {
            entries.remove(&key);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }
}
