//! Expiring key→value store for a single object type.

use dashmap::DashMap;
use preheat_core::{CacheConfig, ObjectType};
use std::sync::Arc;

use super::clock::Clock;
use super::entry::{CacheEntry, Lookup};
use super::stats::{CacheCounters, CacheStats};

/// One object type's cache.
///
/// Entries live in a sharded concurrent map, so concurrent `get`/`put` on
/// the same key never observe a partially written entry. Expired entries are
/// evicted lazily on lookup, or in bulk by [`TypedCache::purge_expired`].
///
/// The configuration is fixed at construction.
#[derive(Debug)]
pub struct TypedCache<T> {
    object_type: ObjectType,
    config: CacheConfig,
    entries: DashMap<String, CacheEntry<T>>,
    clock: Arc<dyn Clock>,
    counters: CacheCounters,
}

impl<T> TypedCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(object_type: ObjectType, config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            object_type,
            config,
            entries: DashMap::new(),
            clock,
            counters: CacheCounters::default(),
        }
    }

    pub fn object_type(&self) -> &ObjectType {
        &self.object_type
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Get a fresh value, or `None` if absent or expired.
    pub fn get(&self, key: &str) -> Option<T> {
        self.lookup(key).into_fresh()
    }

    /// Probe a key, distinguishing fresh hits from stale fallbacks.
    ///
    /// Entries past both TTL and resilience window are evicted here.
    pub fn lookup(&self, key: &str) -> Lookup<T> {
        let now = self.clock.now();

        // The map guard must be released before any removal below.
        let observed = self.entries.get(key).map(|guard| {
            let entry: &CacheEntry<T> = guard.value();
            (
                entry.value().clone(),
                entry.written_at(),
                entry.is_fresh(now, &self.config),
                entry.is_dead(now, &self.config),
            )
        });

        let Some((value, written_at, fresh, dead)) = observed else {
            self.counters.miss();
            return Lookup::Miss;
        };

        if fresh {
            self.counters.hit();
            return Lookup::Fresh(value);
        }

        self.counters.miss();
        if dead {
            // Only remove what we looked at; a concurrent put may have
            // replaced it with a fresh entry.
            if self
                .entries
                .remove_if(key, |_, entry| entry.written_at() == written_at)
                .is_some()
            {
                self.counters.evicted(1);
            }
            return Lookup::Miss;
        }

        Lookup::Stale { value, written_at }
    }

    /// Store a value under a key.
    ///
    /// Absent values and empty keys are not errors: there is nothing to
    /// cache, so the call is a no-op that returns `false`.
    pub fn put(&self, key: impl Into<String>, value: Option<T>) -> bool {
        let key = key.into();
        let Some(value) = value else {
            self.counters.rejected_put();
            return false;
        };
        if key.is_empty() {
            self.counters.rejected_put();
            return false;
        }

        self.entries.insert(key, CacheEntry::new(value, self.clock.now()));
        self.counters.put();
        true
    }

    /// Drop every entry past TTL and resilience window. Returns how many
    /// were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut removed = 0usize;
        self.entries.retain(|_, entry| {
            let keep = !entry.is_dead(now, &self.config);
            if !keep {
                removed += 1;
            }
            keep
        });
        self.counters.evicted(removed as u64);
        removed
    }

    /// Record stale fallbacks handed out by a resolver during an outage.
    pub fn record_stale_served(&self, count: usize) {
        self.counters.stale_served(count as u64);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot(self.entries.len())
    }
}
